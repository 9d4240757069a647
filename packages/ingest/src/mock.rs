//! Built-in demonstration dataset.
//!
//! Loaded at startup and on reset so the dashboard has something to show
//! before any file is uploaded.

use vigil_aadhaar_audit_models::DistrictRecord;

/// `(region, district, risk_score, flagged_count, suspicious_locations)`
const MOCK_ROWS: &[(&str, &str, f64, u64, u64)] = &[
    ("Uttar Pradesh", "Lucknow", 0.94, 1840, 23),
    ("Uttar Pradesh", "Kanpur Nagar", 0.88, 1525, 19),
    ("Uttar Pradesh", "Varanasi", 0.71, 960, 11),
    ("Bihar", "Patna", 0.91, 1710, 21),
    ("Bihar", "Gaya", 0.83, 1190, 14),
    ("Bihar", "Muzaffarpur", 0.64, 720, 8),
    ("Rajasthan", "Jaipur", 0.76, 1050, 12),
    ("Rajasthan", "Jodhpur", 0.52, 480, 6),
    ("Madhya Pradesh", "Bhopal", 0.69, 830, 9),
    ("Madhya Pradesh", "Indore", 0.47, 390, 5),
    ("Maharashtra", "Mumbai Suburban", 0.58, 640, 7),
    ("Maharashtra", "Pune", 0.36, 270, 3),
    ("West Bengal", "Kolkata", 0.62, 700, 8),
    ("West Bengal", "Howrah", 0.41, 310, 4),
    ("Tamil Nadu", "Chennai", 0.27, 150, 2),
    ("Tamil Nadu", "Madurai", 0.18, 90, 1),
    ("Kerala", "Ernakulam", 0.12, 40, 0),
    ("Assam", "Kamrup Metropolitan", 0.55, 520, 6),
];

/// Returns the mock record store, in a fixed order.
#[must_use]
pub fn mock_records() -> Vec<DistrictRecord> {
    MOCK_ROWS
        .iter()
        .map(|&(region, district, risk_score, flagged_count, suspicious_locations)| {
            DistrictRecord::new(
                region,
                district,
                risk_score,
                flagged_count,
                suspicious_locations,
            )
        })
        .collect()
}
