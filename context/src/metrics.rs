/// Truth × prediction counts for one evaluation run.
///
/// Rows index the true context, columns the predicted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build from `(truth, predicted)` class-index pairs. Pairs referring to
    /// classes outside the label table are ignored.
    pub fn from_pairs(
        labels: Vec<String>,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut counts = vec![vec![0; labels.len()]; labels.len()];

        for (truth, predicted) in pairs {
            if let Some(cell) = counts
                .get_mut(truth)
                .and_then(|row| row.get_mut(predicted))
            {
                *cell += 1;
            }
        }

        Self { labels, counts }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn count(&self, truth: usize, predicted: usize) -> usize {
        self.counts
            .get(truth)
            .and_then(|row| row.get(predicted))
            .copied()
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of evaluation samples whose true context is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts
            .get(class)
            .map(|row| row.iter().sum())
            .unwrap_or_default()
    }

    pub fn accuracy(&self) -> f64 {
        let correct = (0..self.labels.len())
            .map(|class| self.count(class, class))
            .sum::<usize>();

        ratio(correct, self.total())
    }

    pub fn precision(&self, class: usize) -> f64 {
        let predicted = self
            .counts
            .iter()
            .map(|row| row.get(class).copied().unwrap_or_default())
            .sum::<usize>();

        ratio(self.count(class, class), predicted)
    }

    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.count(class, class), self.support(class))
    }

    pub fn f1(&self, class: usize) -> f64 {
        let precision = self.precision(class);
        let recall = self.recall(class);

        if precision + recall == 0.0 {
            return 0.0;
        }

        2.0 * precision * recall / (precision + recall)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }

    numerator as f64 / denominator as f64
}
