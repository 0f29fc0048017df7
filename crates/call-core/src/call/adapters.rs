//! Adapters tipados: el conjunto cerrado de formas que convierten funciones
//! Rust comunes en la capacidad `Callable` que el invoker maneja.
//!
//! Formas soportadas:
//! - `func0..func5`: `Fn(..) -> R`. Un retorno `()` declara cero salidas.
//! - `try_func0..try_func5`: `Fn(..) -> Result<R, E>` — la convención de
//!   error a la cola: el `Err` se separa de las salidas y va al handler.
//! - `func{0..3}_2` / `try_func{0..3}_2`: dos salidas (tupla), para que un
//!   paso pueda alimentar más de un valor al siguiente.
//! - `func{0..2}v` / `try_func{0..2}v`: cola variádica — el último
//!   parámetro es `Vec<V>` y recoge todos los argumentos sobrantes.
//!
//! Una firma que no calza en estas formas necesita su propio adapter
//! (implementar `Callable` a mano); el precio de no tener reflexión.

use std::any::{Any, TypeId};
use std::fmt;

use crate::errors::BoxError;
use crate::value::{PipeValue, ValueSet, ValueType};

use super::callable::{CallOutcome, Callable};

/// Callable construido desde una función Rust por los constructores de este
/// módulo. Guarda los metadatos declarados y una clausura monomorfizada que
/// hace el puente dinámico -> tipado.
pub struct FnCallable {
    params: Vec<ValueType>,
    variadic: Option<ValueType>,
    outputs: Vec<ValueType>,
    fallible: bool,
    call: Box<dyn Fn(ValueSet) -> CallOutcome + Send + Sync>,
}

impl Callable for FnCallable {
    fn params(&self) -> &[ValueType] {
        &self.params
    }

    fn variadic(&self) -> Option<ValueType> {
        self.variadic
    }

    fn outputs(&self) -> &[ValueType] {
        &self.outputs
    }

    fn fallible(&self) -> bool {
        self.fallible
    }

    fn call(&self, args: ValueSet) -> CallOutcome {
        (self.call)(args)
    }
}

fn declared_output<R: Any>() -> Vec<ValueType> {
    let ty = ValueType::of::<R>();
    if ty.is_unit() {
        Vec::new()
    } else {
        vec![ty]
    }
}

fn push_output<R>(outputs: &mut ValueSet, value: R)
    where R: Any + fmt::Debug + Send + Sync
{
    if TypeId::of::<R>() != TypeId::of::<()>() {
        outputs.push(PipeValue::new(value));
    }
}

fn arity_exact(args: &ValueSet, want: usize) -> Option<String> {
    if args.len() != want {
        Some(format!("func wants {} arguments, but gets {}", want, args.len()))
    } else {
        None
    }
}

fn arity_at_least(args: &ValueSet, want: usize) -> Option<String> {
    if args.len() < want {
        Some(format!("func wants at least {} arguments, but gets {}", want, args.len()))
    } else {
        None
    }
}

fn take_arg<T: Any + Clone>(args: &ValueSet, i: usize) -> Result<T, String> {
    let v = &args[i];
    v.extract::<T>().ok_or_else(|| {
                        format!("{}. argument is a {} but should be a {}",
                                i + 1,
                                v.value_type(),
                                ValueType::of::<T>())
                    })
}

fn collect_tail<T: Any + Clone>(args: &ValueSet, from: usize) -> Result<Vec<T>, String> {
    let mut tail = Vec::with_capacity(args.len().saturating_sub(from));
    for (i, v) in args.iter().enumerate().skip(from) {
        match v.extract::<T>() {
            Some(t) => tail.push(t),
            None => {
                return Err(format!("{}. argument is a {} but should be a {}",
                                   i + 1,
                                   v.value_type(),
                                   ValueType::of::<T>()))
            }
        }
    }
    Ok(tail)
}

macro_rules! fn_adapter {
    ($name:ident, $try_name:ident; $n:expr; $($ty:ident $var:ident $idx:tt),*) => {
        #[doc = concat!("Adapter para `Fn` de ", stringify!($n),
                        " argumento(s) con un retorno plano (`()` declara cero salidas).")]
        pub fn $name<$($ty,)* R, F>(f: F) -> FnCallable
            where F: Fn($($ty),*) -> R + Send + Sync + 'static,
                  $($ty: Any + Clone + Send + Sync,)*
                  R: Any + fmt::Debug + Send + Sync
        {
            FnCallable { params: vec![$(ValueType::of::<$ty>()),*],
                         variadic: None,
                         outputs: declared_output::<R>(),
                         fallible: false,
                         call: Box::new(move |args: ValueSet| {
                             if let Some(detail) = arity_exact(&args, $n) {
                                 return CallOutcome::Mismatch { detail };
                             }
                             $(let $var: $ty = match take_arg::<$ty>(&args, $idx) {
                                 Ok(v) => v,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };)*
                             let mut outputs = ValueSet::new();
                             push_output(&mut outputs, f($($var),*));
                             CallOutcome::Success { outputs }
                         }) }
        }

        #[doc = concat!("Adapter para `Fn` de ", stringify!($n),
                        " argumento(s) que devuelve `Result` (error a la cola).")]
        pub fn $try_name<$($ty,)* R, E, F>(f: F) -> FnCallable
            where F: Fn($($ty),*) -> Result<R, E> + Send + Sync + 'static,
                  $($ty: Any + Clone + Send + Sync,)*
                  R: Any + fmt::Debug + Send + Sync,
                  E: Into<BoxError>
        {
            FnCallable { params: vec![$(ValueType::of::<$ty>()),*],
                         variadic: None,
                         outputs: declared_output::<R>(),
                         fallible: true,
                         call: Box::new(move |args: ValueSet| {
                             if let Some(detail) = arity_exact(&args, $n) {
                                 return CallOutcome::Mismatch { detail };
                             }
                             $(let $var: $ty = match take_arg::<$ty>(&args, $idx) {
                                 Ok(v) => v,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };)*
                             match f($($var),*) {
                                 Ok(r) => {
                                     let mut outputs = ValueSet::new();
                                     push_output(&mut outputs, r);
                                     CallOutcome::Success { outputs }
                                 }
                                 Err(e) => CallOutcome::Failure { error: e.into() },
                             }
                         }) }
        }
    };
}

fn_adapter!(func0, try_func0; 0; );
fn_adapter!(func1, try_func1; 1; A0 a0 0);
fn_adapter!(func2, try_func2; 2; A0 a0 0, A1 a1 1);
fn_adapter!(func3, try_func3; 3; A0 a0 0, A1 a1 1, A2 a2 2);
fn_adapter!(func4, try_func4; 4; A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3);
fn_adapter!(func5, try_func5; 5; A0 a0 0, A1 a1 1, A2 a2 2, A3 a3 3, A4 a4 4);

macro_rules! fn_adapter_pair {
    ($name:ident, $try_name:ident; $n:expr; $($ty:ident $var:ident $idx:tt),*) => {
        #[doc = concat!("Adapter para `Fn` de ", stringify!($n),
                        " argumento(s) con dos salidas (tupla).")]
        pub fn $name<$($ty,)* R0, R1, F>(f: F) -> FnCallable
            where F: Fn($($ty),*) -> (R0, R1) + Send + Sync + 'static,
                  $($ty: Any + Clone + Send + Sync,)*
                  R0: Any + fmt::Debug + Send + Sync,
                  R1: Any + fmt::Debug + Send + Sync
        {
            FnCallable { params: vec![$(ValueType::of::<$ty>()),*],
                         variadic: None,
                         outputs: vec![ValueType::of::<R0>(), ValueType::of::<R1>()],
                         fallible: false,
                         call: Box::new(move |args: ValueSet| {
                             if let Some(detail) = arity_exact(&args, $n) {
                                 return CallOutcome::Mismatch { detail };
                             }
                             $(let $var: $ty = match take_arg::<$ty>(&args, $idx) {
                                 Ok(v) => v,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };)*
                             let (r0, r1) = f($($var),*);
                             CallOutcome::Success { outputs: vec![PipeValue::new(r0),
                                                                  PipeValue::new(r1)] }
                         }) }
        }

        #[doc = concat!("Adapter para `Fn` de ", stringify!($n),
                        " argumento(s) con dos salidas y error a la cola.")]
        pub fn $try_name<$($ty,)* R0, R1, E, F>(f: F) -> FnCallable
            where F: Fn($($ty),*) -> Result<(R0, R1), E> + Send + Sync + 'static,
                  $($ty: Any + Clone + Send + Sync,)*
                  R0: Any + fmt::Debug + Send + Sync,
                  R1: Any + fmt::Debug + Send + Sync,
                  E: Into<BoxError>
        {
            FnCallable { params: vec![$(ValueType::of::<$ty>()),*],
                         variadic: None,
                         outputs: vec![ValueType::of::<R0>(), ValueType::of::<R1>()],
                         fallible: true,
                         call: Box::new(move |args: ValueSet| {
                             if let Some(detail) = arity_exact(&args, $n) {
                                 return CallOutcome::Mismatch { detail };
                             }
                             $(let $var: $ty = match take_arg::<$ty>(&args, $idx) {
                                 Ok(v) => v,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };)*
                             match f($($var),*) {
                                 Ok((r0, r1)) => {
                                     CallOutcome::Success { outputs: vec![PipeValue::new(r0),
                                                                          PipeValue::new(r1)] }
                                 }
                                 Err(e) => CallOutcome::Failure { error: e.into() },
                             }
                         }) }
        }
    };
}

fn_adapter_pair!(func0_2, try_func0_2; 0; );
fn_adapter_pair!(func1_2, try_func1_2; 1; A0 a0 0);
fn_adapter_pair!(func2_2, try_func2_2; 2; A0 a0 0, A1 a1 1);
fn_adapter_pair!(func3_2, try_func3_2; 3; A0 a0 0, A1 a1 1, A2 a2 2);

macro_rules! fn_adapter_variadic {
    ($name:ident, $try_name:ident; $n:expr; $($ty:ident $var:ident $idx:tt),*) => {
        #[doc = concat!("Adapter variádico: ", stringify!($n),
                        " parámetro(s) fijo(s) y una cola `Vec<V>` que recoge el resto.")]
        pub fn $name<$($ty,)* V, R, F>(f: F) -> FnCallable
            where F: Fn($($ty,)* Vec<V>) -> R + Send + Sync + 'static,
                  $($ty: Any + Clone + Send + Sync,)*
                  V: Any + Clone + Send + Sync,
                  R: Any + fmt::Debug + Send + Sync
        {
            FnCallable { params: vec![$(ValueType::of::<$ty>()),*],
                         variadic: Some(ValueType::of::<V>()),
                         outputs: declared_output::<R>(),
                         fallible: false,
                         call: Box::new(move |args: ValueSet| {
                             if let Some(detail) = arity_at_least(&args, $n) {
                                 return CallOutcome::Mismatch { detail };
                             }
                             $(let $var: $ty = match take_arg::<$ty>(&args, $idx) {
                                 Ok(v) => v,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };)*
                             let tail: Vec<V> = match collect_tail::<V>(&args, $n) {
                                 Ok(t) => t,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };
                             let mut outputs = ValueSet::new();
                             push_output(&mut outputs, f($($var,)* tail));
                             CallOutcome::Success { outputs }
                         }) }
        }

        #[doc = concat!("Adapter variádico con error a la cola: ", stringify!($n),
                        " parámetro(s) fijo(s), cola `Vec<V>`, retorno `Result`.")]
        pub fn $try_name<$($ty,)* V, R, E, F>(f: F) -> FnCallable
            where F: Fn($($ty,)* Vec<V>) -> Result<R, E> + Send + Sync + 'static,
                  $($ty: Any + Clone + Send + Sync,)*
                  V: Any + Clone + Send + Sync,
                  R: Any + fmt::Debug + Send + Sync,
                  E: Into<BoxError>
        {
            FnCallable { params: vec![$(ValueType::of::<$ty>()),*],
                         variadic: Some(ValueType::of::<V>()),
                         outputs: declared_output::<R>(),
                         fallible: true,
                         call: Box::new(move |args: ValueSet| {
                             if let Some(detail) = arity_at_least(&args, $n) {
                                 return CallOutcome::Mismatch { detail };
                             }
                             $(let $var: $ty = match take_arg::<$ty>(&args, $idx) {
                                 Ok(v) => v,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };)*
                             let tail: Vec<V> = match collect_tail::<V>(&args, $n) {
                                 Ok(t) => t,
                                 Err(detail) => return CallOutcome::Mismatch { detail },
                             };
                             match f($($var,)* tail) {
                                 Ok(r) => {
                                     let mut outputs = ValueSet::new();
                                     push_output(&mut outputs, r);
                                     CallOutcome::Success { outputs }
                                 }
                                 Err(e) => CallOutcome::Failure { error: e.into() },
                             }
                         }) }
        }
    };
}

fn_adapter_variadic!(func0v, try_func0v; 0; );
fn_adapter_variadic!(func1v, try_func1v; 1; A0 a0 0);
fn_adapter_variadic!(func2v, try_func2v; 2; A0 a0 0, A1 a1 1);
