//! Conversions between declaration names and template names.

const INTERFACE_PREFIX: &str = "Ion";

/// Converts a component interface name to its tag name.
///
/// `IonItem` becomes `ion-item` and `IonSelectOption` becomes
/// `ion-select-option`. Names without the `Ion` prefix yield `None`.
pub fn tag_name(interface: &str) -> Option<String> {
    let rest = interface.strip_prefix(INTERFACE_PREFIX)?;
    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let mut tag = String::from("ion");
    for c in rest.chars() {
        if c.is_ascii_uppercase() {
            tag.push('-');
            tag.push(c.to_ascii_lowercase());
        } else {
            tag.push(c);
        }
    }
    Some(tag)
}

/// Converts a dash-case attribute name to the camel-case property name.
pub fn camel_case(attribute: &str) -> String {
    let mut out = String::with_capacity(attribute.len());
    let mut upper = false;
    for c in attribute.chars() {
        if c == '-' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_to_tag() {
        assert_eq!(tag_name("IonItem").as_deref(), Some("ion-item"));
        assert_eq!(tag_name("IonSelectOption").as_deref(), Some("ion-select-option"));
        assert_eq!(tag_name("IonProgressBar").as_deref(), Some("ion-progress-bar"));
        assert_eq!(tag_name("Ionic"), None);
        assert_eq!(tag_name("PickerColumn"), None);
    }

    #[test]
    fn attribute_to_property() {
        assert_eq!(camel_case("router-direction"), "routerDirection");
        assert_eq!(camel_case("lines"), "lines");
    }
}
