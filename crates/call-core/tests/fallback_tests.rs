//! Modo fallback: parar en el primer éxito, reglas del último paso.

use std::sync::{Arc, Mutex};

use call_core::{args, func1, try_func1, PipelineError, Pipeline, Stop, PIPE};

fn fails(tag: &'static str) -> impl Fn(String) -> Result<String, String> + Send + Sync + 'static {
    move |_s: String| Err(tag.to_string())
}

#[test]
fn stops_at_the_first_position_that_succeeds() {
    let third_ran = Arc::new(Mutex::new(false));
    let flag = third_ran.clone();

    let mut q = Pipeline::new()
        .add(try_func1(fails("A")), args!["x".to_string()])
        .add(try_func1(|s: String| Ok::<String, String>(s)), args!["ok".to_string()])
        .add(try_func1(move |s: String| {
                 *flag.lock().unwrap() = true;
                 Ok::<String, String>(s)
             }),
             args!["never".to_string()]);

    let out = q.fallback();
    assert_eq!(out.position, 1);
    assert!(out.succeeded());
    assert!(!*third_ran.lock().unwrap(), "las posiciones posteriores no se intentan");
}

#[test]
fn exhaustion_reports_the_last_steps_original_error() {
    // handler por defecto Ignore: igual se reporta el error original del
    // último paso, que es el último recurso del caller
    let mut q = Pipeline::new().add(try_func1(fails("A")), args!["x".to_string()])
                               .add(try_func1(fails("B")), args!["x".to_string()]);

    let out = q.fallback();
    assert_eq!(out.position, 1);
    assert_eq!(out.error.expect("debe reportar la falla final").to_string(), "B");
}

#[test]
fn stop_handler_interrupts_at_the_first_error() {
    let mut q = Pipeline::new().on_error(Stop)
                               .add(try_func1(fails("A")), args!["x".to_string()])
                               .add(try_func1(|s: String| Ok::<String, String>(s)),
                                    args!["ok".to_string()]);

    let out = q.fallback();
    assert_eq!(out.position, 0);
    assert_eq!(out.error.unwrap().to_string(), "A");
}

#[test]
fn transformed_error_on_the_last_step_is_what_gets_reported() {
    let mut q = Pipeline::new()
        .on_error(call_core::handler_fn(|err| {
            Some(PipelineError::call(format!("transformed: {err}")))
        }))
        .add(try_func1(fails("only")), args!["x".to_string()]);

    let out = q.fallback();
    assert_eq!(out.position, 0);
    assert_eq!(out.error.unwrap().to_string(), "transformed: only");
}

#[test]
fn parse_as_int_else_as_float() {
    let mut q = Pipeline::new().add(try_func1(|s: String| s.parse::<i64>()),
                                    args!["3.5".to_string()])
                               .add(try_func1(|s: String| s.parse::<f64>()),
                                    args!["3.5".to_string()]);

    let out = q.fallback();
    assert_eq!(out.position, 1);
    assert!(out.error.is_none());
}

#[test]
fn branches_run_only_for_the_winning_position() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let losing = seen.clone();
    let winning = seen.clone();

    let mut q = Pipeline::new()
        .add(try_func1(fails("A")), args!["x".to_string()])
        .branch(func1(move |s: String| losing.lock().unwrap().push(format!("loser:{s}"))),
                args![PIPE])
        .add(try_func1(|s: String| Ok::<String, String>(s)), args!["win".to_string()])
        .branch(func1(move |s: String| winning.lock().unwrap().push(format!("winner:{s}"))),
                args![PIPE]);

    let out = q.fallback();
    assert_eq!(out.position, 1);
    assert!(out.succeeded());
    assert_eq!(*seen.lock().unwrap(), vec!["winner:win".to_string()]);
}

#[test]
fn empty_queue_reports_position_zero_without_error() {
    let out = Pipeline::new().fallback();
    assert_eq!(out.position, 0);
    assert!(out.succeeded());
}
