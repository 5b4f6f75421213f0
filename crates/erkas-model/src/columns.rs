//! Canonical column names of the summary tables and region subsets.

use crate::role::ClassificationFamily;

pub const REGION: &str = "Kanton";
pub const FORMAT: &str = "Format";
pub const INTERVAL: &str = "Berechnungsintervall [m]";
pub const TOTAL: &str = "Durchgangsstrasse [km]";
pub const EXEMPTED: &str = "KB-befreit [km]";

/// Number of classification codes per family (codes 0 through 5).
pub const CODE_COUNT: usize = 6;

/// `Zu beurteilen Ampelcode<family> [km]`.
pub fn not_yet_assessed(family: ClassificationFamily) -> String {
    format!("Zu beurteilen Ampelcode{} [km]", family.suffix())
}

/// `Beurteilt Ampelcode<family> [km]`.
pub fn assessed(family: ClassificationFamily) -> String {
    format!("Beurteilt Ampelcode{} [km]", family.suffix())
}

/// `Ampelcode<family><code>`.
pub fn code(family: ClassificationFamily, code: usize) -> String {
    format!("Ampelcode{}{code}", family.suffix())
}

/// The fixed column order of every summary table.
pub fn canonical_columns() -> Vec<String> {
    let mut columns = vec![
        REGION.to_string(),
        FORMAT.to_string(),
        INTERVAL.to_string(),
        TOTAL.to_string(),
        EXEMPTED.to_string(),
    ];
    for family in ClassificationFamily::ALL {
        columns.push(not_yet_assessed(family));
        columns.push(assessed(family));
        for value in 0..CODE_COUNT {
            columns.push(code(family, value));
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_columns_has_fixed_shape() {
        let columns = canonical_columns();
        assert_eq!(columns.len(), 5 + 3 * (2 + CODE_COUNT));
        assert_eq!(columns[0], "Kanton");
        assert_eq!(columns[5], "Zu beurteilen AmpelcodePers [km]");
        assert_eq!(columns[6], "Beurteilt AmpelcodePers [km]");
        assert_eq!(columns[7], "AmpelcodePers0");
        assert_eq!(columns[12], "AmpelcodePers5");
        assert_eq!(columns.last().map(String::as_str), Some("AmpelcodeGW5"));
    }
}
