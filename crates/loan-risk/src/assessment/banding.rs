use super::domain::CreditBand;

/// Inclusive upper bounds, checked in ascending order. Scores above the last bound are
/// `Excellent`.
const BAND_CEILINGS: [(u32, CreditBand); 3] = [
    (500, CreditBand::VeryPoor),
    (650, CreditBand::Poor),
    (750, CreditBand::Good),
];

/// Map a credit score onto its band. Total over `u32`.
pub fn band_for_score(score: u32) -> CreditBand {
    BAND_CEILINGS
        .iter()
        .find(|(ceiling, _)| score <= *ceiling)
        .map(|(_, band)| *band)
        .unwrap_or(CreditBand::Excellent)
}
