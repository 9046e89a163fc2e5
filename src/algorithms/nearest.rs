use crate::core::GeoFix;

/// Linear nearest-neighbour scan.
///
/// Returns the candidate closest to `origin` under `metric` together with
/// its distance. Candidates at equal distance resolve to the one seen
/// first. NaN distances never win.
pub fn nearest_by<'a, T, P, M>(
    origin: &GeoFix,
    candidates: impl IntoIterator<Item = &'a T>,
    position: P,
    metric: M,
) -> Option<(&'a T, f64)>
where
    T: 'a,
    P: Fn(&T) -> GeoFix,
    M: Fn(&GeoFix, &GeoFix) -> f64,
{
    let mut best: Option<(&'a T, f64)> = None;

    for candidate in candidates {
        let d = metric(origin, &position(candidate));
        if d.is_nan() {
            continue;
        }
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((candidate, d)),
        }
    }

    best
}
