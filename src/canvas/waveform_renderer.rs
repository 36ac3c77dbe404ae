use crate::types::{ChartPoint, SampleSeries};

/// Chart points for a series, reduced to a min/max envelope when there are
/// more samples than `max_points`.
///
/// At most `max_points` points are returned. Each bucket contributes its minimum
/// and maximum in the order they occur, so the curve keeps its peaks and the
/// time axis stays increasing.
pub fn envelope_points(time: &[f64], values: &[f64], max_points: usize) -> Vec<ChartPoint> {
    let n = time.len().min(values.len());
    if n == 0 || max_points == 0 {
        return Vec::new();
    }
    if n <= max_points || max_points < 2 {
        // A single-point chart just gets the first sample.
        let keep = if n <= max_points { n } else { 1 };
        return (0..keep)
            .map(|i| ChartPoint { time: time[i], value: values[i] })
            .collect();
    }

    let buckets = max_points / 2;
    let mut points = Vec::with_capacity(buckets * 2);

    for b in 0..buckets {
        let i0 = b * n / buckets;
        let i1 = ((b + 1) * n / buckets).min(n);
        if i0 >= i1 {
            continue;
        }

        let mut min_i = i0;
        let mut max_i = i0;
        for i in i0..i1 {
            if values[i] < values[min_i] {
                min_i = i;
            }
            if values[i] > values[max_i] {
                max_i = i;
            }
        }

        let (first, second) = if min_i <= max_i { (min_i, max_i) } else { (max_i, min_i) };
        points.push(ChartPoint { time: time[first], value: values[first] });
        if second != first {
            points.push(ChartPoint { time: time[second], value: values[second] });
        }
    }

    points
}

/// Strain envelope for a chart `max_points` wide.
pub fn waveform_envelope(series: &SampleSeries, max_points: usize) -> Vec<ChartPoint> {
    envelope_points(&series.time, &series.strain, max_points)
}

/// Frequency curve for a chart `max_points` wide.
pub fn frequency_envelope(series: &SampleSeries, max_points: usize) -> Vec<ChartPoint> {
    envelope_points(&series.time, &series.frequency, max_points)
}
