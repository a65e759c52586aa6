use owo_colors::{OwoColorize, Stream::Stderr};

/// Shared trait implemented by all error types in voxelmesh. An error
/// carries a stable name plus labelled context values, and renders itself as
/// a short report for the terminal.
///
pub trait VoxelmeshError {
  /// Returns the stable human-readable tag for this error kind.
  ///
  fn name(&self) -> &'static str;

  /// Returns labelled context values describing the failure. Implementations
  /// never include file paths or patient identifiers.
  ///
  fn details(&self) -> Vec<(&'static str, String)> {
    vec![]
  }

  /// Renders the error as a report: a headline naming the failure and the
  /// interrupted task, followed by one indented line per context value.
  ///
  fn to_report(&self, task: &str) -> String {
    let mut report = format!("error: {} (while {})", self.name(), task);

    for (label, value) in self.details() {
      report.push_str("\n  ");
      report.push_str(label);
      report.push_str(": ");
      report.push_str(&value);
    }

    report
  }

  /// Prints the report to stderr, highlighting the headline when the
  /// terminal supports color.
  ///
  fn print(&self, task: &str) {
    let report = self.to_report(task);
    let mut lines = report.lines();

    if let Some(headline) = lines.next() {
      eprintln!(
        "{}",
        headline.if_supports_color(Stderr, |text| text.bright_red())
      );
    }

    for line in lines {
      eprintln!("{}", line);
    }
  }
}
