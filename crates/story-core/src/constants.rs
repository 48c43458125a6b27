//! Constantes del core.
//!
//! `ENGINE_VERSION` participa en el `definition_hash` de cada historia
//! compilada: un cambio incompatible en el aplanado debe invalidar los hashes
//! aunque la declaración no cambie.
pub const ENGINE_VERSION: &str = "S1.0";

/// Separador usado al renderizar rutas de historias (`a.x.one`).
pub const PATH_SEPARATOR: &str = ".";
