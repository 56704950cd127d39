use once_cell::sync::Lazy;
use regex::Regex;

static ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i: \(€[0-9]+ (?:more|cheaper) than price list\))",
        r"|(?i: \(model 202[^)]+\))",
        r"|(?i: \(Taxi\))",
        r"|(?i: \(exported\))",
        r"|(?i: \(price list [^)]+\))",
        r"|(?i: without FCA-JX/HDA2)",
        r"|(?i: \((?:19|20) inch wheels\))",
        r"|(?i: \(Digital Teal/Mystic Olive with Panoramic Roof\))",
        r"| \(Olive\)",
        r"| \(Shooting Star\)",
        r"| \(Atlas White Matte\)",
    ))
    .expect("annotation pattern is valid")
});

/// Strip every annotation from a resolved label, leaving the trim key used
/// for aggregation. Stripping repeats until nothing matches, so the result
/// is a fixed point.
pub fn normalize_label(label: &str) -> String {
    let mut current = label.to_string();
    loop {
        let stripped = ANNOTATION.replace_all(&current, "");
        if stripped == current.as_str() {
            break;
        }
        current = stripped.into_owned();
    }
    current.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_all_annotations() {
        let label = "73 kWh Lounge with panoramic roof without FCA-JX/HDA2 \
                     (price list May 2022 E1200 discount) (€250 more than price list) \
                     (Shooting Star) (19 inch wheels) (Taxi) (exported) (model 2022.5)";
        assert_eq!(normalize_label(label), "73 kWh Lounge with panoramic roof");
    }

    #[test]
    fn keeps_limited_edition_and_plain_labels() {
        assert_eq!(normalize_label("PROJECT45 (19 inch wheels)"), "PROJECT45");
        assert_eq!(normalize_label("58 kWh Style with heat pump"), "58 kWh Style with heat pump");
    }

    #[test]
    fn idempotent_on_nested_annotations() {
        let label = "73 kWh Style (Ta (Taxi)xi)";
        let once = normalize_label(label);
        assert_eq!(once, "73 kWh Style");
        assert_eq!(normalize_label(&once), once);
    }

    #[test]
    fn olive_with_panoramic_roof() {
        assert_eq!(
            normalize_label(
                "73 kWh Connect (price list May 2022) (Digital Teal/Mystic Olive with Panoramic Roof)"
            ),
            "73 kWh Connect"
        );
    }
}
