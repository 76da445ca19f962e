use crate::maze::{CellKey, Direction};

/// Ordered consumer of traversal records.
///
/// The generator and every search push one `(cell, arrival)` record per cell
/// they touch, in the exact order the cells are examined. Delivery order
/// equals push order. Implementations must accept any valid pair without
/// failing and must not call back into the producer; whatever drains the
/// records (a render thread, a test buffer) is on its own schedule.
pub trait VisitSink {
    fn record(&mut self, key: CellKey, arrival: Option<Direction>);
}

/// Discards every record. Used when only the returned path matters.
pub struct NullSink;

impl VisitSink for NullSink {
    fn record(&mut self, _key: CellKey, _arrival: Option<Direction>) {}
}

/// Buffers records in push order; tests read traversal order straight out
/// of the vector.
impl VisitSink for Vec<(CellKey, Option<Direction>)> {
    fn record(&mut self, key: CellKey, arrival: Option<Direction>) {
        self.push((key, arrival));
    }
}

/// Adapts a closure into a sink. The app wraps channel senders this way,
/// swallowing send errors so a disconnected consumer never fails the
/// algorithm.
pub struct FnSink<F>(pub F);

impl<F: FnMut(CellKey, Option<Direction>)> VisitSink for FnSink<F> {
    fn record(&mut self, key: CellKey, arrival: Option<Direction>) {
        (self.0)(key, arrival);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_preserves_push_order() {
        let mut sink: Vec<(CellKey, Option<Direction>)> = Vec::new();
        sink.record(3, None);
        sink.record(1, Some(Direction::Left));
        sink.record(2, Some(Direction::Up));
        assert_eq!(
            sink,
            vec![(3, None), (1, Some(Direction::Left)), (2, Some(Direction::Up))]
        );
    }

    #[test]
    fn test_fn_sink_forwards_records() {
        let mut seen = Vec::new();
        {
            let mut sink = FnSink(|key, arrival| seen.push((key, arrival)));
            sink.record(9, Some(Direction::Down));
        }
        assert_eq!(seen, vec![(9, Some(Direction::Down))]);
    }
}
