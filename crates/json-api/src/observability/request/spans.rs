//! Route labels for request spans and metrics.

use uuid::Uuid;

/// Replace id segments so every product maps to the same label.
pub(super) fn route_label(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut label = String::from("/");
    let mut after_sku = false;

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            label.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            label.push_str("{product}");
        } else if after_sku {
            label.push_str("{sku}");
        } else {
            label.push_str(segment);
        }

        after_sku = segment == "sku";
    }

    label
}
