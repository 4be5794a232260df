pub struct StatsHelper;

impl StatsHelper {
    /// Index of the strictly smallest key. Ties keep the first occurrence.
    pub fn argmin_by<I, F>(items: I, key: F) -> Option<usize>
    where
        I: IntoIterator,
        F: Fn(&I::Item) -> f64,
    {
        let mut best: Option<(usize, f64)> = None;
        for (idx, item) in items.into_iter().enumerate() {
            let value = key(&item);
            let is_better = match best {
                Some((_, current)) => value < current,
                None => true,
            };
            if is_better {
                best = Some((idx, value));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn round_to(value: f64, places: i32) -> f64 {
        let factor = 10f64.powi(places);
        (value * factor).round() / factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmin_empty_sequence_yields_none() {
        let empty: Vec<f64> = Vec::new();
        assert_eq!(StatsHelper::argmin_by(empty, |v| *v), None);
    }

    #[test]
    fn argmin_keeps_first_of_equal_values() {
        let values = [2.0, 1.0, 3.0, 1.0];
        assert_eq!(StatsHelper::argmin_by(values.iter(), |v| **v), Some(1));
    }

    #[test]
    fn round_to_two_places() {
        assert_eq!(StatsHelper::round_to(1.23456, 2), 1.23);
        assert_eq!(StatsHelper::round_to(0.005, 2), 0.01);
    }
}
