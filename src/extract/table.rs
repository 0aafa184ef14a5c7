/// One `<td>` as it appears in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub text: String,
    pub row_span: usize,
}

impl RawCell {
    pub fn spanning(text: impl Into<String>, row_span: usize) -> Self {
        Self {
            text: text.into(),
            row_span,
        }
    }
}

pub type HeaderList = Vec<String>;

/// A fully populated row, values in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalRow {
    values: Vec<String>,
}

impl LogicalRow {
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

#[derive(Debug, Clone, Default)]
struct SpanSlot {
    remaining: usize,
    carried: String,
}

/// Per-column rowspan bookkeeping for a single pass over one table.
#[derive(Debug)]
pub struct SpanState {
    slots: Vec<SpanSlot>,
}

impl SpanState {
    pub fn new(width: usize) -> Self {
        Self {
            slots: vec![SpanSlot::default(); width],
        }
    }

    pub fn width(&self) -> usize {
        self.slots.len()
    }

    /// Aligns one physical row against the active spans and returns the
    /// logical values. Columns hidden by a span must form the leading prefix
    /// of the row; surplus cells beyond the header width are dropped.
    pub fn advance(&mut self, cells: &[RawCell]) -> LogicalRow {
        let deficit = self.width().saturating_sub(cells.len());
        let padded = std::iter::repeat_n(None, deficit).chain(cells.iter().map(Some));

        let mut values = Vec::with_capacity(self.width());
        for (slot, cell) in self.slots.iter_mut().zip(padded) {
            if slot.remaining == 0 {
                // A padded position with no span still open has nothing fresh
                // to read; the previous value is carried.
                if let Some(cell) = cell {
                    slot.carried = cell.text.trim().to_string();
                    slot.remaining = cell.row_span.saturating_sub(1);
                }
            } else {
                slot.remaining -= 1;
            }
            values.push(slot.carried.clone());
        }

        LogicalRow { values }
    }
}

/// Reconstructs one logical row per physical row, resolving rowspans.
pub fn stitch(headers: &[String], rows: &[Vec<RawCell>]) -> Vec<LogicalRow> {
    let mut state = SpanState::new(headers.len());
    rows.iter().map(|row| state.advance(row)).collect()
}
