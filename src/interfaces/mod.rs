pub mod plot;
pub mod reporting;

pub use plot::render_leg_boxplots;
pub use reporting::AnalysisReporter;
