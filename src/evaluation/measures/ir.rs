/// Confusion counts for one label or one instance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    /// Relevant and predicted
    pub tp: usize,

    /// Irrelevant but predicted
    pub fp: usize,

    /// Relevant but not predicted
    pub fn_: usize,

    /// Irrelevant and not predicted
    pub tn: usize,
}

impl Counts {
    /// Count one decision
    pub fn add(&mut self, predicted: bool, relevant: bool) {
        match (predicted, relevant) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    /// Count paired decisions
    pub fn from_pairs(predicted: &[bool], relevant: &[bool]) -> Self {
        let mut counts = Self::default();
        for (&p, &r) in predicted.iter().zip(relevant) {
            counts.add(p, r);
        }

        counts
    }

    /// Sum of two counts
    pub fn merge(self, other: Counts) -> Self {
        Self {
            tp: self.tp + other.tp,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
            tn: self.tn + other.tn,
        }
    }
}

/// 1 when nothing is relevant or predicted, 0 when nothing is predicted
pub fn precision(c: Counts) -> f64 {
    if c.tp + c.fp + c.fn_ == 0 {
        return 1.0;
    }
    if c.tp + c.fp == 0 {
        return 0.0;
    }

    c.tp as f64 / (c.tp + c.fp) as f64
}

/// 1 when nothing is relevant or predicted, 0 when nothing is relevant
pub fn recall(c: Counts) -> f64 {
    if c.tp + c.fp + c.fn_ == 0 {
        return 1.0;
    }
    if c.tp + c.fn_ == 0 {
        return 0.0;
    }

    c.tp as f64 / (c.tp + c.fn_) as f64
}

/// Harmonic mean of precision and recall
pub fn f_measure(c: Counts) -> f64 {
    if c.tp + c.fp + c.fn_ == 0 {
        return 1.0;
    }

    (2 * c.tp) as f64 / (2 * c.tp + c.fp + c.fn_) as f64
}

/// 1 when nothing is wrong and nothing is negative
pub fn specificity(c: Counts) -> f64 {
    if c.tn + c.fp + c.fn_ == 0 {
        return 1.0;
    }
    if c.tn + c.fp == 0 {
        return 0.0;
    }

    c.tn as f64 / (c.tn + c.fp) as f64
}

/// Jaccard index of predicted and relevant sets, 1 when both are empty
pub fn accuracy(c: Counts) -> f64 {
    let union = c.tp + c.fp + c.fn_;
    if union == 0 {
        return 1.0;
    }

    c.tp as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn counts(tp: usize, fp: usize, fn_: usize, tn: usize) -> Counts {
        Counts { tp, fp, fn_, tn }
    }

    #[rstest]
    #[case(counts(0, 0, 0, 3), 1.0, 1.0, 1.0, 1.0)]
    #[case(counts(0, 0, 2, 1), 0.0, 0.0, 0.0, 1.0)]
    #[case(counts(2, 1, 1, 1), 2.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 0.5)]
    #[case(counts(1, 0, 0, 0), 1.0, 1.0, 1.0, 1.0)]
    fn test_ratios(
        #[case] c: Counts,
        #[case] p: f64,
        #[case] r: f64,
        #[case] f: f64,
        #[case] s: f64,
    ) {
        assert!((precision(c) - p).abs() < 1e-12);
        assert!((recall(c) - r).abs() < 1e-12);
        assert!((f_measure(c) - f).abs() < 1e-12);
        assert!((specificity(c) - s).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(counts(0, 0, 0, 4)), 1.0);
        assert_eq!(accuracy(counts(1, 1, 2, 0)), 0.25);
    }

    #[test]
    fn test_from_pairs() {
        let c = Counts::from_pairs(&[true, false, true, false], &[true, true, false, false]);

        assert_eq!(c, counts(1, 1, 1, 1));
        assert_eq!(c.merge(c), counts(2, 2, 2, 2));
    }
}
