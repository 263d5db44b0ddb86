//! Structural checks over realistic samples, one library version at a time.
//!
//! Checks are declared the way task files declare them (JSON, tagged by
//! `type`) so these also cover the task-file wire format.

use verbench_core::checker::{run_checks, run_checks_on, SourceSet};
use verbench_core::CheckSpec;

fn checks(json: &str) -> Vec<CheckSpec> {
    serde_json::from_str(json).expect("check list parses")
}

fn passed(results: &[verbench_core::CheckResult]) -> Vec<bool> {
    results.iter().map(|r| r.passed).collect()
}

const NEXT15_CHECKS: &str = r#"[
    {"type": "await_present", "call": "cookies"},
    {"type": "import_exists", "name": "cookies", "from": "next/headers"},
    {"type": "function_absent", "name": "getServerSideProps"},
    {"type": "import_absent", "name": "useRouter", "from": "next/router"},
    {"type": "async_function", "name": "Page"}
]"#;

#[test]
fn next15_server_component_passes() {
    let src = r#"
import { cookies } from 'next/headers';

export default async function Page() {
  const store = await cookies();
  const theme = store.get('theme');
  return <Layout theme={theme} />;
}
"#;
    let results = run_checks(src, &checks(NEXT15_CHECKS));
    assert_eq!(passed(&results), vec![true; 5], "{results:#?}");
}

#[test]
fn next12_habits_fail_against_next15() {
    let src = r#"
import { cookies } from 'next/headers';
import { useRouter } from 'next/router';

export async function getServerSideProps() {
  const store = cookies();
  return { props: {} };
}

export default function Page() {
  const router = useRouter();
  return null;
}
"#;
    let results = run_checks(src, &checks(NEXT15_CHECKS));
    assert_eq!(passed(&results), vec![false, true, false, false, false]);
    assert_eq!(
        results[0].message,
        "1 of 1 call(s) to 'cookies' not awaited (line 6)"
    );
    assert_eq!(results[3].message, "'useRouter' is imported from 'next/router'");
}

#[test]
fn react18_root_api() {
    let list = checks(
        r#"[
            {"type": "import_exists", "name": "createRoot", "from": "react-dom/client"},
            {"type": "call_absent", "call": "ReactDOM.render"},
            {"type": "module_import_absent", "module": "react-dom"}
        ]"#,
    );
    let modern = "import { createRoot } from 'react-dom/client';\ncreateRoot(el).render(<App />);";
    assert_eq!(passed(&run_checks(modern, &list)), vec![true, true, true]);

    let legacy = "import ReactDOM from 'react-dom';\nReactDOM.render(<App />, el);";
    let results = run_checks(legacy, &list);
    assert_eq!(passed(&results), vec![false, false, false]);
    assert_eq!(results[1].message, "'ReactDOM.render' is used (line 2)");
}

#[test]
fn empty_sample_fails_presence_passes_absence() {
    let list = checks(
        r#"[
            {"type": "directive_present", "directive": "use client"},
            {"type": "await_absent", "call": "headers"},
            {"type": "property_absent", "property": "runtime"}
        ]"#,
    );
    assert_eq!(passed(&run_checks("", &list)), vec![false, true, true]);
}

#[test]
fn file_scoped_checks_over_a_multi_file_sample() {
    let sources = SourceSet::from_files([
        (
            "app/actions.ts",
            "'use server'\nexport async function save(data: FormData) { await db.insert(data); }",
        ),
        (
            "app/form.tsx",
            "'use client'\nimport { save } from './actions';\nexport function Form() { return <form action={save} />; }",
        ),
    ]);
    let list = checks(
        r#"[
            {"type": "directive_present", "directive": "use server", "file": "actions.ts"},
            {"type": "directive_present", "directive": "use client", "file": "form.tsx"},
            {"type": "directive_present", "directive": "use server", "file": "form.tsx"},
            {"type": "type_annotation", "parameter": "data", "annotation": "FormData"},
            {"type": "import_exists", "name": "save", "file": "page.tsx"}
        ]"#,
    );
    let results = run_checks_on(&sources, &list);
    assert_eq!(passed(&results), vec![true, true, false, true, false]);
    assert!(results[2].message.starts_with("app/form.tsx: "));
    assert_eq!(results[4].message, "file 'page.tsx' not found in sample");
}

#[test]
fn one_offending_file_fails_an_absence_check() {
    let sources = SourceSet::from_files([
        ("a.ts", "export const a = 1;"),
        ("b.ts", "export function getStaticProps() {}"),
    ]);
    let list = checks(r#"[{"type": "function_absent", "name": "getStaticProps"}]"#);
    let results = run_checks_on(&sources, &list);
    assert!(!results[0].passed);
    assert_eq!(results[0].message, "'getStaticProps' is exported");
    assert_eq!(results[0].file.as_deref(), Some("b.ts"));
}

const ROUTER_LOADER: &str = r#"[
    {"type": "property_location", "property": "loader", "inside_call": "createBrowserRouter"}
]"#;

#[test]
fn route_loader_inside_router_array_argument() {
    let src = "const router = createBrowserRouter([{ path: '/', loader }]);";
    let results = run_checks(src, &checks(ROUTER_LOADER));
    assert!(results[0].passed, "{results:#?}");
}

#[test]
fn route_loader_passed_to_another_call_fails() {
    let src = "const router = createBrowserRouter([{ path: '/' }]);\nregister({ loader });";
    let results = run_checks(src, &checks(ROUTER_LOADER));
    assert!(!results[0].passed);
    assert_eq!(results[0].message, "'loader' set outside createBrowserRouter() (line 2)");
}

#[test]
fn async_generator_by_name() {
    let list = checks(r#"[{"type": "async_generator", "name": "g"}]"#);
    let generator = "export async function* g() { yield 1; }";
    assert!(run_checks(generator, &list)[0].passed);

    let plain = "export async function g() { return 1; }";
    let results = run_checks(plain, &list);
    assert!(!results[0].passed);
    assert_eq!(results[0].message, "'g' is not an async generator");

    let method = "class Feed {\n  async *g() {\n    yield await next();\n  }\n}";
    assert!(run_checks(method, &list)[0].passed);
}
