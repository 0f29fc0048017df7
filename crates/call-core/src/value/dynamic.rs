use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Identidad de tipo de un valor dinámico.
///
/// La asignabilidad entre tipos es identidad exacta de `TypeId`; el nombre
/// completo se conserva sólo para diagnósticos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueType {
    id: TypeId,
    name: &'static str,
}

impl ValueType {
    pub fn of<T: Any>() -> Self {
        Self { id: TypeId::of::<T>(),
               name: std::any::type_name::<T>() }
    }

    /// Nombre completo con paths (`alloc::string::String`).
    pub fn full_name(&self) -> &'static str {
        self.name
    }

    /// `true` si un valor de este tipo puede ocupar una posición que
    /// declara `other`.
    pub fn assignable_to(&self, other: &ValueType) -> bool {
        self.id == other.id
    }

    pub fn is_unit(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&short_name(self.name))
    }
}

/// Recorta los paths de módulo de un nombre de tipo, respetando genéricos:
/// `alloc::vec::Vec<alloc::string::String>` -> `Vec<String>`.
pub fn short_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut seg = String::new();
    for c in full.chars() {
        match c {
            ':' => seg.clear(),
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                out.push_str(&seg);
                seg.clear();
                out.push(c);
            }
            _ => seg.push(c),
        }
    }
    out.push_str(&seg);
    out
}

/// Valor dinámico compartido e inmutable.
///
/// Se clona barato (Arc) porque el mismo valor puede alimentar la próxima
/// llamada, los branches y los feeds a la vez. El renderizador de debug se
/// captura monomorfizado en la construcción para poder loguear argumentos y
/// salidas sin exigir `Debug` al consumidor.
#[derive(Clone)]
pub struct PipeValue {
    inner: Arc<dyn Any + Send + Sync>,
    ty: ValueType,
    fmt: fn(&(dyn Any + Send + Sync)) -> String,
}

fn debug_render<T: Any + fmt::Debug>(any: &(dyn Any + Send + Sync)) -> String {
    match any.downcast_ref::<T>() {
        Some(v) => format!("{:?}", v),
        None => "<?>".to_string(),
    }
}

impl PipeValue {
    pub fn new<T>(value: T) -> Self
        where T: Any + fmt::Debug + Send + Sync
    {
        Self { inner: Arc::new(value),
               ty: ValueType::of::<T>(),
               fmt: debug_render::<T> }
    }

    pub fn value_type(&self) -> ValueType {
        self.ty
    }

    pub fn is<T: Any>(&self) -> bool {
        self.ty.id == TypeId::of::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Copia tipada del valor (los adapters la usan para reconstruir los
    /// argumentos concretos de la función envuelta).
    pub fn extract<T: Any + Clone>(&self) -> Option<T> {
        self.inner.downcast_ref::<T>().cloned()
    }

    /// Representación de debug para registros y errores estructurados.
    pub fn render(&self) -> String {
        (self.fmt)(&*self.inner)
    }
}

impl fmt::Debug for PipeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Conjunto ordenado de salidas no-error de una llamada.
pub type ValueSet = Vec<PipeValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_paths_inside_generics() {
        assert_eq!(short_name("alloc::string::String"), "String");
        assert_eq!(short_name("alloc::vec::Vec<alloc::string::String>"), "Vec<String>");
        assert_eq!(short_name("(i64, alloc::string::String)"), "(i64, String)");
        assert_eq!(short_name("&str"), "&str");
    }

    #[test]
    fn extract_requires_exact_type() {
        let v = PipeValue::new(5i64);
        assert_eq!(v.extract::<i64>(), Some(5));
        assert!(v.extract::<i32>().is_none());
        assert!(v.is::<i64>());
    }

    #[test]
    fn render_uses_debug_of_the_original_type() {
        let v = PipeValue::new("hola".to_string());
        assert_eq!(v.render(), "\"hola\"");
        assert_eq!(v.value_type().to_string(), "String");
    }
}
