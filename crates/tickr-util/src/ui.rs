use indicatif::{ProgressBar, ProgressStyle};

/// Progress over a batch of per-ticker calls, prefixed with what is being fetched;
/// the message slot shows the ticker in flight.
pub fn batch_pb(length: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(length).with_prefix(label.to_string());
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{prefix:>14} [{elapsed_precise}] [ {bar:40} ] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#|-"));
    }
    pb
}
