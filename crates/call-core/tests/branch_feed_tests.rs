//! Branches ("tees") y feeds: invocaciones laterales y colas dependientes.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use call_core::{args, func0, func1, try_func1, Ignore, Pipeline, PipelineError, PIPE};

#[test]
fn branch_gets_the_step_outputs_and_its_own_are_discarded() {
    let teed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let observer = teed.clone();
    let main_got: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = main_got.clone();

    let mut q = Pipeline::new()
        .add(func0(|| "hi".to_string()), args![])
        .branch(func1(move |s: String| {
                    observer.lock().unwrap().push(s);
                    "branch-output".to_string()
                }),
                args![PIPE])
        .add(func1(move |s: String| *sink.lock().unwrap() = Some(s)), args![PIPE]);

    q.run().expect("la cola debería completarse");
    assert_eq!(*teed.lock().unwrap(), vec!["hi".to_string()]);
    // el siguiente paso recibe la salida del paso principal, no la del branch
    assert_eq!(main_got.lock().unwrap().as_deref(), Some("hi"));
}

#[test]
fn branch_error_goes_through_the_same_handler() {
    let branch_err = || {
        Pipeline::new().add(func0(|| "hi".to_string()), args![])
                       .branch(try_func1(|_s: String| -> Result<(), String> {
                                   Err("tee failed".to_string())
                               }),
                               args![PIPE])
    };

    // con la política por defecto (Stop) el error del branch detiene la cola
    let err = branch_err().run().expect_err("el branch falla");
    assert_eq!(err.to_string(), "tee failed");

    // con Ignore la cola sigue
    assert!(branch_err().on_error(Ignore).run().is_ok());
}

#[test]
fn feed_installs_start_values_for_the_next_run() {
    let got: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = got.clone();

    let dependent = Arc::new(Mutex::new(
        Pipeline::new().add(func1(move |s: String| sink.lock().unwrap().push(s)), args![PIPE]),
    ));

    let mut main = Pipeline::new().add(func0(|| "fed".to_string()), args![])
                                  .feed(dependent.clone());
    main.run().unwrap();

    // la dependiente consume lo que el feed instaló
    dependent.lock().unwrap().run().expect("la dependiente recibe su start value");
    assert_eq!(*got.lock().unwrap(), vec!["fed".to_string()]);

    // transitorio: una segunda ejecución ya no tiene start values y el PIPE
    // se expande a nada -> aridad incompatible
    let err = dependent.lock().unwrap().run().expect_err("sin start values");
    assert!(matches!(err, PipelineError::InvalidArgument { .. }));
}

#[test]
fn branch_can_be_a_full_subqueue_in_run_mode() {
    let acc: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
    let sink = acc.clone();

    let sub = Arc::new(Mutex::new(
        Pipeline::new().add(func1(|s: String| format!("{s}heho")), args![PIPE])
                       .add(func1(move |s: String| sink.lock().unwrap().push_str(&s)),
                            args![PIPE]),
    ));

    let mut main = Pipeline::new().add(func0(|| "hi".to_string()), args![])
                                  .branch_run(sub.clone());
    main.run().unwrap();

    assert_eq!(*acc.lock().unwrap(), "hiheho");
}

#[test]
fn branch_can_be_a_full_subqueue_in_fallback_mode() {
    let winner: Arc<Mutex<Option<f64>>> = Arc::new(Mutex::new(None));
    let sink = winner.clone();

    let sub = Arc::new(Mutex::new(
        Pipeline::new().add(try_func1(|s: String| s.parse::<i64>().map(|n| n as f64)),
                            args![PIPE])
                       .add(try_func1(move |s: String| {
                                let v = s.parse::<f64>()?;
                                *sink.lock().unwrap() = Some(v);
                                Ok::<f64, std::num::ParseFloatError>(v)
                            }),
                            args![PIPE]),
    ));

    let mut main = Pipeline::new().add(func0(|| "3.5".to_string()), args![])
                                  .branch_fallback(sub.clone());
    main.run().unwrap();

    assert_eq!(*winner.lock().unwrap(), Some(3.5));
}

#[test]
fn subqueue_fallback_branch_pipes_start_values_to_every_alternative() {
    // el primer intento del fallback falla con el valor entubado, el
    // segundo lo consume: ambos ven el mismo start value
    let attempts: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let first = attempts.clone();
    let second = attempts.clone();

    let sub = Arc::new(Mutex::new(
        Pipeline::new().add(try_func1(move |s: String| -> Result<(), String> {
                                first.lock().unwrap().push(format!("int:{s}"));
                                Err("not an int".to_string())
                            }),
                            args![PIPE])
                       .add(func1(move |s: String| {
                                second.lock().unwrap().push(format!("float:{s}"));
                            }),
                            args![PIPE]),
    ));

    let mut main = Pipeline::new().add(func0(|| "3.5".to_string()), args![])
                                  .branch_fallback(sub.clone());
    main.run().unwrap();

    assert_eq!(*attempts.lock().unwrap(),
               vec!["int:3.5".to_string(), "float:3.5".to_string()]);
}

#[test]
fn shared_subqueue_attached_twice_accumulates_state() {
    // la misma instancia (mismo Arc) adjunta en dos posiciones: el estado
    // compartido se acumula; quien quiera independencia clona la cola antes
    let count: Arc<Mutex<usize>> = Arc::new(Mutex::new(0));
    let sink = count.clone();

    let sub = Arc::new(Mutex::new(
        Pipeline::new().add(func1(move |_s: String| *sink.lock().unwrap() += 1), args![PIPE]),
    ));

    let mut main = Pipeline::new().add(func0(|| "one".to_string()), args![])
                                  .branch_run(sub.clone())
                                  .add(func1(|s: String| s), args![PIPE])
                                  .branch_run(sub.clone());
    main.run().unwrap();

    assert_eq!(*count.lock().unwrap(), 2);
}

#[test]
fn poisoned_branch_target_bypasses_even_an_ignore_handler() {
    let sub = Arc::new(Mutex::new(Pipeline::new().add(func0(|| ()), args![])));

    let poison = sub.clone();
    let _ = catch_unwind(AssertUnwindSafe(move || {
        let _guard = poison.lock().unwrap();
        panic!("poison");
    }));

    let mut q = Pipeline::new().on_error(Ignore)
                               .add(func0(|| "x".to_string()), args![])
                               .branch_run(sub);

    let err = q.run().expect_err("estructural: no pasa por el handler");
    assert!(matches!(err, PipelineError::InvalidCall { .. }));
}

#[test]
fn feeds_are_installed_even_in_fallback_mode_for_the_winner() {
    let got: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
    let sink = got.clone();

    let dependent = Arc::new(Mutex::new(
        Pipeline::new().add(func1(move |s: String| *sink.lock().unwrap() = Some(s)),
                            args![PIPE]),
    ));

    let mut main = Pipeline::new()
        .add(try_func1(|_s: String| -> Result<String, String> { Err("no".to_string()) }),
             args!["x".to_string()])
        .add(try_func1(|s: String| Ok::<String, String>(s)), args!["win".to_string()])
        .feed(dependent.clone());

    let out = main.fallback();
    assert_eq!(out.position, 1);
    assert!(out.succeeded());

    dependent.lock().unwrap().run().unwrap();
    assert_eq!(got.lock().unwrap().as_deref(), Some("win"));
}
