#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fraction of the remaining distance to the latest snapshot covered per
    /// second of rendered time.
    pub interpolation_rate: f32,
    /// Overrides the generated identity, e.g. to resume a session.
    pub guid: Option<uuid::Uuid>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            interpolation_rate: 15.0,
            guid: None,
        }
    }
}
