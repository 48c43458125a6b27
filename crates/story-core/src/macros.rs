//! Macros para declarar tablas de métodos sin repetir nombres.
//!
//! Exportadas en la raíz del crate:
//!   use story_core::method_table;

/// Construye una `MethodTable` a partir de métodos del host.
///
/// Formas soportadas:
/// - `method_table!(Host { one, two })`: métodos inherentes de `Host`; la
///   tabla se llama `"Host"`.
/// - `method_table!(Host as Mixin { before, after })`: métodos del trait
///   `Mixin` implementado por `Host`; la tabla se llama `"Mixin"`.
#[macro_export]
macro_rules! method_table {
    ($host:ty as $provider:ident { $($method:ident),* $(,)? }) => {
        $crate::story::MethodTable::<$host>::new(stringify!($provider))
            $(.method(stringify!($method), <$host as $provider>::$method))*
    };
    ($host:ty { $($method:ident),* $(,)? }) => {
        $crate::story::MethodTable::<$host>::new(stringify!($host))
            $(.method(stringify!($method), <$host>::$method))*
    };
}
