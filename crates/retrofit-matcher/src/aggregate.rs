//! Grouping and ranking of measures by mean savings.

use retrofit_core::{MeasureGroup, SimulationRecord};
use retrofit_stats::descriptive;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureSavings {
    pub measure: String,
    pub savings_percent: f64,
}

/// A measure group with its mean savings and contributing measures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRanking {
    pub group: MeasureGroup,
    pub mean_savings_percent: f64,
    pub measures: Vec<MeasureSavings>,
}

/// Classifies `records`, averages savings per group and ranks the groups.
///
/// Groups are sorted by descending mean savings. The sort is stable, so
/// groups with equal means keep the order in which they first appear in
/// `records`. Measures within a group keep their input order.
///
/// # Examples
///
/// ```
/// use retrofit_core::{MeasureGroup, SimulationRecord, VariantRatios, WindowShareBucket};
/// use retrofit_matcher::aggregate::rank_groups;
///
/// let record = |measure: &str, savings_percent: f64| SimulationRecord {
///     variant_index: 0,
///     ratios: VariantRatios { va: 0.5, awbf: 1.0 },
///     measure: measure.to_owned(),
///     bucket: WindowShareBucket::quantize(30.0),
///     savings_percent,
/// };
/// let records = [
///     record("Fenstertausch 2-fach", 6.0),
///     record("Fenstertausch 3-fach", 10.0),
///     record("AW Sanierung 16cm", 12.0),
/// ];
///
/// let ranking = rank_groups(&records);
/// assert_eq!(ranking[0].group, MeasureGroup::Aw);
/// assert_eq!(ranking[1].group, MeasureGroup::Fenster);
/// assert_eq!(ranking[1].mean_savings_percent, 8.0);
/// ```
pub fn rank_groups<'a, I>(records: I) -> Vec<GroupRanking>
where
    I: IntoIterator<Item = &'a SimulationRecord>,
{
    let mut grouped: Vec<(MeasureGroup, Vec<MeasureSavings>)> = vec![];
    for record in records {
        let group = record.group();
        let savings = MeasureSavings {
            measure: record.measure.clone(),
            savings_percent: record.savings_percent,
        };
        match grouped.iter_mut().find(|(g, _)| *g == group) {
            Some((_, measures)) => measures.push(savings),
            None => grouped.push((group, vec![savings])),
        }
    }

    let mut ranking = grouped
        .into_iter()
        .filter_map(|(group, measures)| {
            let mean = descriptive::mean(measures.iter().map(|m| m.savings_percent))?;
            Some(GroupRanking {
                group,
                mean_savings_percent: mean,
                measures,
            })
        })
        .collect::<Vec<_>>();
    ranking.sort_by(|a, b| b.mean_savings_percent.total_cmp(&a.mean_savings_percent));
    ranking
}
