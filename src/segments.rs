/// Inclusive range of ordinals handed to one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub lower: u64,
    pub upper: u64,
}

impl Segment {
    pub fn new(lower: u64, upper: u64) -> Self {
        Self { lower, upper }
    }
}

/// Splits `[from, to]` into at most `amount` contiguous segments of equal size,
/// the last one taking the remainder.
///
/// An inverted range or `amount == 0` yields no segments. When the range is
/// shorter than `amount`, every segment holds a single value.
pub fn split_segments(from: u64, to: u64, amount: usize) -> Vec<Segment> {
    if from > to || amount == 0 {
        return Vec::new();
    }

    let span = u128::from(to - from) + 1;
    let size = (span / amount as u128).clamp(1, u128::from(u64::MAX)) as u64;

    let mut segments = Vec::with_capacity(amount.min(span.min(usize::MAX as u128) as usize));
    let mut left = from;
    let mut remaining = amount;
    loop {
        let mut right = left.saturating_add(size - 1);
        if remaining == 1 || right > to {
            right = to;
        }
        segments.push(Segment::new(left, right));

        remaining -= 1;
        if remaining == 0 || right == to {
            break;
        }
        left = right + 1;
    }
    segments
}
