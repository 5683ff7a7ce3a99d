//! End-to-end programs through the public interpreter surface.
use slate_interp::{run_program, Event, Host, Interpreter};

fn run_ok(src: &str) -> String {
    let (result, events) = run_program(src, &[]);
    let out = result.expect("program should succeed");
    assert!(
        events.iter().any(|e| matches!(e, Event::Done(_))),
        "missing Done event: {:?}",
        events
    );
    out
}

fn run_err(src: &str) -> String {
    let (result, events) = run_program(src, &[]);
    let err = result.expect_err("program should fail").to_string();
    assert!(
        events.iter().any(|e| matches!(e, Event::Error(_))),
        "missing Error event: {:?}",
        events
    );
    err
}

fn warnings(events: &[Event]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Warning(w) => Some(w.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn declare_assign_output() {
    let out = run_ok("DECLARE X : INTEGER\nX <- 5\nOUTPUT X + 1");
    assert_eq!(out, "6");
}

#[test]
fn output_concatenates_comma_list() {
    let out = run_ok("OUTPUT \"Sum: \", 2 + 3, \"!\"");
    assert_eq!(out, "Sum: 5!");
}

#[test]
fn real_variables_keep_their_point() {
    let src = "DECLARE R : REAL\nR <- 1.0\nOUTPUT R\nOUTPUT 2.5 + 0.5";
    assert_eq!(run_ok(src), "1.0\n3");
}

#[test]
fn integer_arithmetic_stays_integer_division_widens() {
    assert_eq!(run_ok("OUTPUT 2 + 3 * 4"), "14");
    assert_eq!(run_ok("OUTPUT 7 / 2"), "3.5");
    assert_eq!(run_ok("OUTPUT 7 DIV 2, \" \", 7 MOD 2"), "3 1");
    assert_eq!(run_ok("OUTPUT DIV(-7, 2), \" \", MOD(-7, 2)"), "-4 1");
    assert_eq!(run_ok("OUTPUT 2 ^ 10"), "1024");
}

#[test]
fn division_by_zero() {
    let err = run_err("OUTPUT 5 / 0");
    assert_eq!(err, "Line 1: ZeroDivisionError: division by zero");
    let err = run_err("OUTPUT 5 DIV 0");
    assert!(err.contains("ZeroDivisionError"));
}

#[test]
fn if_else_nested() {
    let src = "\
DECLARE N : INTEGER
N <- 7
IF N > 10 THEN
  OUTPUT \"big\"
ELSE
  IF N > 5 THEN
    OUTPUT \"medium\"
  ELSE
    OUTPUT \"small\"
  ENDIF
ENDIF";
    assert_eq!(run_ok(src), "medium");
}

#[test]
fn if_two_line_then_form() {
    let src = "IF 1 < 2\nTHEN\nOUTPUT \"yes\"\nENDIF";
    assert_eq!(run_ok(src), "yes");
}

#[test]
fn if_condition_must_be_boolean() {
    let err = run_err("IF 1 THEN\nOUTPUT 1\nENDIF");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn case_of_first_match_and_otherwise() {
    let src = "\
DECLARE G : CHAR
G <- 'B'
CASE OF G
  'A' : OUTPUT \"excellent\"
  'B' : OUTPUT \"good\"
  'B' : OUTPUT \"shadowed\"
  OTHERWISE OUTPUT \"ungraded\"
ENDCASE";
    assert_eq!(run_ok(src), "good");
    let src = "\
DECLARE G : CHAR
G <- 'Z'
CASE OF G
  'A' : OUTPUT \"excellent\"
  OTHERWISE OUTPUT \"ungraded\"
ENDCASE";
    assert_eq!(run_ok(src), "ungraded");
}

#[test]
fn for_loop_counts_and_steps() {
    assert_eq!(run_ok("FOR i <- 1 TO 3\nOUTPUT i\nNEXT i"), "1\n2\n3");
    assert_eq!(run_ok("FOR i <- 5 TO 1 STEP -2\nOUTPUT i\nNEXT i"), "5\n3\n1");
    // descending range with the default step runs zero times
    assert_eq!(run_ok("FOR i <- 5 TO 1\nOUTPUT i\nNEXT i\nOUTPUT \"done\""), "done");
}

#[test]
fn for_rejects_zero_step_and_non_integer_parts() {
    let err = run_err("FOR i <- 1 TO 3 STEP 0\nOUTPUT i\nNEXT i");
    assert!(err.contains("ValueError"), "{}", err);
    let err = run_err("FOR i <- 1.5 TO 3\nOUTPUT i\nNEXT i");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn while_and_repeat() {
    let src = "\
DECLARE X : INTEGER
X <- 0
WHILE X < 3 DO
  X <- X + 1
ENDWHILE
OUTPUT X";
    assert_eq!(run_ok(src), "3");
    let src = "\
DECLARE X : INTEGER
X <- 5
REPEAT
  OUTPUT X
  X <- X - 1
UNTIL X = 3";
    assert_eq!(run_ok(src), "5\n4");
}

#[test]
fn runaway_loop_hits_the_iteration_ceiling() {
    let err = run_err("REPEAT\nUNTIL FALSE");
    assert!(err.contains("RuntimeError"), "{}", err);
    assert!(err.contains("limit"), "{}", err);
}

#[test]
fn procedures_take_parameters_and_scope_locally() {
    let src = "\
PROCEDURE Greet(Name : STRING)
  DECLARE Msg : STRING
  Msg <- \"Hello, \" + Name
  OUTPUT Msg
ENDPROCEDURE
CALL Greet(\"Ada\")
OUTPUT \"after\"";
    assert_eq!(run_ok(src), "Hello, Ada\nafter");
    // locals do not leak out of the call
    let err = run_err("PROCEDURE P\nDECLARE L : INTEGER\nENDPROCEDURE\nCALL P\nOUTPUT L");
    assert!(err.contains("NameError"), "{}", err);
}

#[test]
fn procedure_frames_chain_to_global_not_the_caller() {
    let src = "\
DECLARE G : INTEGER
G <- 10
PROCEDURE Inner
  OUTPUT G
ENDPROCEDURE
PROCEDURE Outer
  DECLARE G2 : INTEGER
  G2 <- 99
  CALL Inner
ENDPROCEDURE
CALL Outer";
    assert_eq!(run_ok(src), "10");
    let err = run_err(
        "PROCEDURE Inner\nOUTPUT Hidden\nENDPROCEDURE\nPROCEDURE Outer\nDECLARE Hidden : INTEGER\nHidden <- 1\nCALL Inner\nENDPROCEDURE\nCALL Outer",
    );
    assert!(err.contains("NameError"), "{}", err);
}

#[test]
fn functions_return_values() {
    let src = "\
FUNCTION Sq(N : INTEGER) RETURNS INTEGER
  RETURN N * N
ENDFUNCTION
OUTPUT Sq(4)";
    assert_eq!(run_ok(src), "16");
}

#[test]
fn function_recursion() {
    let src = "\
FUNCTION Fact(N : INTEGER) RETURNS INTEGER
  IF N <= 1 THEN
    RETURN 1
  ENDIF
  RETURN N * Fact(N - 1)
ENDFUNCTION
OUTPUT Fact(5)";
    assert_eq!(run_ok(src), "120");
}

#[test]
fn function_without_return() {
    // declared return type: falling off the end is an error
    let err = run_err("FUNCTION F RETURNS INTEGER\nOUTPUT 1\nENDFUNCTION\nOUTPUT F()");
    assert!(err.contains("TypeError"), "{}", err);
    // no declared type: the call yields the text \"undefined\"
    let out = run_ok("FUNCTION F\nOUTPUT \"side\"\nENDFUNCTION\nOUTPUT F()");
    assert_eq!(out, "side\nundefined");
}

#[test]
fn return_outside_function_is_a_syntax_error() {
    let err = run_err("RETURN 1");
    assert!(err.contains("SyntaxError"), "{}", err);
}

#[test]
fn wrong_arity_and_wrong_argument_type() {
    let src = "FUNCTION Sq(N : INTEGER) RETURNS INTEGER\nRETURN N * N\nENDFUNCTION\nOUTPUT Sq(1, 2)";
    assert!(run_err(src).contains("TypeError"));
    let src = "FUNCTION Sq(N : INTEGER) RETURNS INTEGER\nRETURN N * N\nENDFUNCTION\nOUTPUT Sq(TRUE)";
    assert!(run_err(src).contains("TypeError"));
}

#[test]
fn parameter_binding_enforces_literal_forms() {
    // the same literal rules as assignment apply when binding arguments
    let src = "FUNCTION Sq(N : INTEGER) RETURNS INTEGER\nRETURN N * N\nENDFUNCTION\nOUTPUT Sq(3.0)";
    let err = run_err(src);
    assert!(err.contains("TypeError"), "{}", err);
    let src = "PROCEDURE P(S : STRING)\nOUTPUT S\nENDPROCEDURE\nCALL P('a')";
    let err = run_err(src);
    assert!(err.contains("TypeError"), "{}", err);
    let src = "PROCEDURE P(C : CHAR)\nOUTPUT C\nENDPROCEDURE\nCALL P(\"a\")";
    let err = run_err(src);
    assert!(err.contains("TypeError"), "{}", err);
    // computed values still bind by the runtime rules
    let src = "FUNCTION Sq(N : INTEGER) RETURNS INTEGER\nRETURN N * N\nENDFUNCTION\nOUTPUT Sq(6 / 2)";
    assert_eq!(run_ok(src), "9");
}

#[test]
fn for_loop_at_the_integer_ceiling_terminates() {
    let src = "FOR i <- 9223372036854775807 TO 9223372036854775807\nOUTPUT \"hit\"\nNEXT i\nOUTPUT \"done\"";
    assert_eq!(run_ok(src), "hit\ndone");
}

#[test]
fn arrays_read_write_and_range_check() {
    let src = "\
DECLARE A : ARRAY[1:3] OF INTEGER
A[1] <- 10
A[2] <- A[1] + 5
OUTPUT A[1], \" \", A[2], \" \", A[3]";
    assert_eq!(run_ok(src), "10 15 0");

    let err = run_err("DECLARE A : ARRAY[1:3] OF INTEGER\nA[4] <- 1");
    assert_eq!(
        err,
        "Line 2: IndexError: index 4 out of range 1..3 (dimension 1)"
    );
}

#[test]
fn two_dimensional_arrays() {
    let src = "\
DECLARE Grid : ARRAY[1:2, 1:3] OF INTEGER
DECLARE r, c : INTEGER
FOR r <- 1 TO 2
  FOR c <- 1 TO 3
    Grid[r, c] <- r * 10 + c
  NEXT c
NEXT r
OUTPUT Grid[2, 3], \" \", Grid[1, 1]";
    assert_eq!(run_ok(src), "23 11");
    let err = run_err("DECLARE G : ARRAY[1:2, 1:2] OF INTEGER\nOUTPUT G[1]");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn bad_array_bounds() {
    let err = run_err("DECLARE A : ARRAY[3:1] OF INTEGER");
    assert!(err.contains("ValueError"), "{}", err);
}

#[test]
fn whole_array_assignment_rejected() {
    let err = run_err("DECLARE A : ARRAY[1:3] OF INTEGER\nA <- 1");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn declared_types_are_enforced() {
    let err = run_err("DECLARE X : INTEGER\nX <- 3.0");
    assert_eq!(err, "Line 2: TypeError: cannot store the REAL literal 3.0 in an INTEGER");
    // a computed whole REAL lands fine
    assert_eq!(run_ok("DECLARE X : INTEGER\nX <- 6 / 2\nOUTPUT X"), "3");
    let err = run_err("DECLARE C : CHAR\nC <- \"a\"");
    assert!(err.contains("TypeError"), "{}", err);
    let err = run_err("DECLARE S : STRING\nS <- 'a'");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn constants_are_immutable_and_literal_only() {
    assert_eq!(run_ok("CONSTANT Pi = 3.14\nOUTPUT Pi"), "3.14");
    let err = run_err("CONSTANT Pi = 3.14\nPi <- 3");
    assert!(err.contains("TypeError"), "{}", err);
    let err = run_err("CONSTANT K = 1 + 2");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn equals_assignment_gets_a_hint() {
    let err = run_err("DECLARE X : INTEGER\nX = 5");
    assert!(err.contains("SyntaxError"), "{}", err);
    assert!(err.contains("X <- 5"), "{}", err);
}

#[test]
fn undeclared_and_uninitialized_variables() {
    let err = run_err("OUTPUT Nothing");
    assert_eq!(err, "Line 1: NameError: 'Nothing' is not defined");
    let err = run_err("DECLARE X : INTEGER\nOUTPUT X");
    assert!(err.contains("before initialization"), "{}", err);
}

#[test]
fn identifier_case_is_insensitive_with_one_warning_per_site() {
    let src = "\
DECLARE Total : INTEGER
Total <- 1
total <- total + 1
total <- total + 1
OUTPUT TOTAL";
    let (result, events) = run_program(src, &[]);
    assert_eq!(result.unwrap(), "3");
    let warns = warnings(&events);
    // line 3 and line 4 reuse the same alias; each site warns once, as does
    // the OUTPUT reference
    assert_eq!(warns.len(), 3, "{:?}", warns);
    assert!(warns[0].contains("'total'"), "{:?}", warns);
    assert!(warns[0].contains("'Total'"), "{:?}", warns);
}

#[test]
fn declaring_a_reserved_word_warns_but_works() {
    let (result, events) = run_program("DECLARE Length : INTEGER\nLength <- 2\nOUTPUT Length", &[]);
    assert_eq!(result.unwrap(), "2");
    let warns = warnings(&events);
    assert_eq!(warns.len(), 1, "{:?}", warns);
    assert!(warns[0].contains("reserved"), "{:?}", warns);
}

#[test]
fn input_coerces_toward_the_declared_type() {
    let src = "\
DECLARE N : INTEGER
DECLARE B : BOOLEAN
DECLARE C : CHAR
INPUT N
INPUT B
INPUT C
OUTPUT N + 1, \" \", B, \" \", C";
    let (result, events) = run_program(src, &["41", "true", "x"]);
    assert_eq!(result.unwrap(), "42 TRUE x");
    let requests = events.iter().filter(|e| matches!(e, Event::InputRequest)).count();
    assert_eq!(requests, 3);
}

#[test]
fn input_of_non_numeric_text_into_integer_fails() {
    let (result, _) = run_program("DECLARE N : INTEGER\nINPUT N", &["hello"]);
    assert!(result.unwrap_err().to_string().contains("TypeError"));
}

#[test]
fn input_past_the_end_of_the_channel_stops() {
    let (result, _) = run_program("DECLARE N : INTEGER\nINPUT N", &[]);
    assert_eq!(result.unwrap_err().to_string(), "stopped");
}

#[test]
fn cancellation_stops_the_run() {
    let (host, _ev_rx, _in_tx, cancel) = Host::channel();
    cancel.store(true, std::sync::atomic::Ordering::Relaxed);
    let mut interp = Interpreter::new(host);
    let err = interp.interpret("OUTPUT 1").unwrap_err();
    assert_eq!(err.to_string(), "stopped");
}

#[test]
fn builtins_work_end_to_end() {
    assert_eq!(run_ok("OUTPUT LENGTH(\"hello\")"), "5");
    assert_eq!(run_ok("OUTPUT UCASE(\"abc\"), LCASE(\"DeF\")"), "ABCdef");
    assert_eq!(run_ok("OUTPUT SUBSTRING(\"HELLO\", 2, 3)"), "ELL");
    assert_eq!(run_ok("OUTPUT ROUND(2.567, 2)"), "2.57");
    let src = "DECLARE R : REAL\nR <- RANDOM()\nIF R >= 0 AND R < 1 THEN\nOUTPUT \"ok\"\nENDIF";
    assert_eq!(run_ok(src), "ok");
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(run_ok("OUTPUT 1 < 2 AND NOT FALSE"), "TRUE");
    assert_eq!(run_ok("OUTPUT \"apple\" < \"banana\""), "TRUE");
    assert_eq!(run_ok("OUTPUT 'a' = \"a\""), "TRUE");
    assert_eq!(run_ok("OUTPUT 3 <> 4"), "TRUE");
    let err = run_err("OUTPUT 1 = \"1\"");
    assert!(err.contains("TypeError"), "{}", err);
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let src = "// header\n\nOUTPUT 1 // trailing\nOUTPUT \"a//b\"";
    assert_eq!(run_ok(src), "1\na//b");
}

#[test]
fn output_events_stream_per_line() {
    let (result, events) = run_program("OUTPUT 1\nOUTPUT 2", &[]);
    assert_eq!(result.unwrap(), "1\n2");
    let outs: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::Output(s) => Some(s.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(outs, ["1", "2"]);
}

#[test]
fn unclosed_block_reports_the_opener_line() {
    let err = run_err("OUTPUT 1\nWHILE TRUE DO\nOUTPUT 2");
    assert_eq!(err, "Line 2: SyntaxError: WHILE without a matching ENDWHILE");
}
