/// `Init -> ResolvingConfig -> BuildingGraph -> Serializing -> Done`. `Failed` is reachable
/// from every phase but `Done`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
  #[default]
  Init,
  ResolvingConfig,
  BuildingGraph,
  Serializing,
  Done,
  Failed,
}

impl BuildPhase {
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Done | Self::Failed)
  }
}
