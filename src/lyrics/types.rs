/// One display line of timed lyrics. `time` is seconds from track start.
///
/// A `Vec<LyricLine>` produced by the parser is always sorted ascending by
/// `time`; the mapper in `sync.rs` relies on that ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
}
