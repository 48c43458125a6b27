/// Estado de una ejecución de historia.
///
/// Las transiciones válidas son:
/// - `Start` -> `Running`
/// - `Running` -> `Completed`
/// - `Running` -> `Failed`
///
/// `Completed` y `Failed` son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Aún no se creó el contexto.
    Start,
    /// Ejecutando steps en orden.
    Running,
    /// Todos los steps terminaron (o un step pidió terminar) con éxito.
    Completed,
    /// Un step falló; no se ejecutan más steps.
    Failed,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Failed)
    }

    /// Aplica una transición. Las transiciones inválidas son un bug del engine.
    pub(crate) fn advance(self, next: RunStatus) -> RunStatus {
        debug_assert!(matches!((self, next),
                               (RunStatus::Start, RunStatus::Running)
                               | (RunStatus::Running, RunStatus::Completed)
                               | (RunStatus::Running, RunStatus::Failed)),
                      "invalid run transition {self:?} -> {next:?}");
        next
    }
}
