use super::scan::{FunctionInfo, SourceIndex};
use super::type_text;
use crate::model::CheckSpec;

/// Result of one check against one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FileOutcome {
    /// The file satisfies the check.
    Pass(String),
    /// The file violates the check.
    Fail(String),
    /// The file contains nothing the check is about.
    NotApplicable(String),
}

pub(crate) fn evaluate(idx: &SourceIndex, check: &CheckSpec) -> FileOutcome {
    use FileOutcome::{Fail, NotApplicable, Pass};

    match check {
        CheckSpec::ImportExists { name, from, .. } => match find_import(idx, name, from.as_deref()) {
            Some(module) => Pass(format!("'{}' is imported from '{}'", name, module)),
            None => match find_import(idx, name, None) {
                Some(other) if from.is_some() => NotApplicable(format!(
                    "'{}' is imported from '{}', expected '{}'",
                    name,
                    other,
                    from.as_deref().unwrap_or_default()
                )),
                _ => NotApplicable(format!("'{}' is not imported", name)),
            },
        },
        CheckSpec::ImportAbsent { name, from, .. } => match find_import(idx, name, from.as_deref()) {
            Some(module) => Fail(format!("'{}' is imported from '{}'", name, module)),
            None => NotApplicable(format!("'{}' is not imported", name)),
        },
        CheckSpec::ModuleImportAbsent { module, .. } => {
            let referenced = idx.imports.iter().any(|d| d.module == *module)
                || idx.module_refs.iter().any(|m| m == module);
            if referenced {
                Fail(format!("module '{}' is imported", module))
            } else {
                NotApplicable(format!("module '{}' is not imported", module))
            }
        }
        CheckSpec::FunctionExported { name, .. } => {
            if idx.exports.iter().any(|e| e == name) {
                Pass(format!("'{}' is exported", name))
            } else {
                NotApplicable(format!("'{}' is not exported", name))
            }
        }
        CheckSpec::FunctionAbsent { name, .. } => {
            if idx.exports.iter().any(|e| e == name) {
                Fail(format!("'{}' is exported", name))
            } else {
                NotApplicable(format!("'{}' is not exported", name))
            }
        }
        CheckSpec::AwaitPresent { call, .. } => {
            let target = CallTarget::parse(call);
            let sites: Vec<_> = idx.calls.iter().filter(|c| target.matches(&c.callee)).collect();
            if sites.is_empty() {
                return NotApplicable(format!("no call to '{}'", call));
            }
            match sites.iter().find(|c| !c.awaited) {
                None => Pass(format!("every call to '{}' is awaited", call)),
                Some(first) => Fail(format!(
                    "{} of {} call(s) to '{}' not awaited (line {})",
                    sites.iter().filter(|c| !c.awaited).count(),
                    sites.len(),
                    call,
                    first.line
                )),
            }
        }
        CheckSpec::AwaitAbsent { call, .. } => {
            let target = CallTarget::parse(call);
            match idx
                .calls
                .iter()
                .find(|c| c.awaited && target.matches(&c.callee))
            {
                Some(site) => Fail(format!("'{}' is awaited (line {})", call, site.line)),
                None => NotApplicable(format!("'{}' is not awaited", call)),
            }
        }
        CheckSpec::CallExists { call, .. } => match find_usage(idx, call) {
            Some(line) => Pass(format!("'{}' is used (line {})", call, line)),
            None => NotApplicable(format!("'{}' is never used", call)),
        },
        CheckSpec::CallAbsent { call, .. } => match find_usage(idx, call) {
            Some(line) => Fail(format!("'{}' is used (line {})", call, line)),
            None => NotApplicable(format!("'{}' is never used", call)),
        },
        CheckSpec::DirectivePresent { directive, .. } => {
            if idx.directives.iter().any(|d| d == directive) {
                Pass(format!("directive '{}' present", directive))
            } else {
                NotApplicable(format!("directive '{}' missing", directive))
            }
        }
        CheckSpec::PropertyLocation {
            property,
            inside_call,
            ..
        } => property_location(idx, property, inside_call),
        CheckSpec::AsyncFunction { name, .. } => {
            function_flag(idx, name.as_deref(), "async", |f| f.is_async)
        }
        CheckSpec::AsyncGenerator { name, .. } => {
            function_flag(idx, name.as_deref(), "an async generator", |f| {
                f.is_async && f.is_generator
            })
        }
        CheckSpec::YieldPresent { name, .. } => yield_present(idx, name.as_deref()),
        CheckSpec::TypeAnnotation {
            parameter,
            annotation,
            ..
        } => type_annotation(idx, parameter, annotation),
        CheckSpec::PropertyAbsent {
            property,
            in_object,
            ..
        } => {
            let hit = idx.objects.iter().find(|o| {
                o.keys.iter().any(|k| k == property)
                    && in_object
                        .as_deref()
                        .map_or(true, |name| o.bound_to.as_deref() == Some(name))
            });
            match (hit, in_object) {
                (Some(o), Some(obj)) => Fail(format!(
                    "property '{}' set in '{}' (line {})",
                    property, obj, o.line
                )),
                (Some(o), None) => Fail(format!("property '{}' set (line {})", property, o.line)),
                (None, _) => NotApplicable(format!("property '{}' not set", property)),
            }
        }
    }
}

/// A call target as written in a check: `fetch`, `z.string`, `<Suspense />`.
struct CallTarget {
    segments: Vec<String>,
}

impl CallTarget {
    fn parse(raw: &str) -> Self {
        let mut t = raw.trim();
        t = t.strip_prefix("new ").unwrap_or(t).trim();
        t = t.strip_prefix('<').unwrap_or(t);
        t = t.strip_suffix("/>").unwrap_or(t);
        t = t.strip_suffix('>').unwrap_or(t);
        t = t.trim();
        t = t.strip_suffix("()").unwrap_or(t);
        Self {
            segments: t
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Suffix match of the target segments against a member path.
    fn matches(&self, path: &[String]) -> bool {
        !self.segments.is_empty()
            && path.len() >= self.segments.len()
            && path[path.len() - self.segments.len()..] == self.segments[..]
    }

    fn contained_in(&self, path: &[String]) -> bool {
        let n = self.segments.len();
        n > 0 && path.windows(n).any(|w| w == &self.segments[..])
    }
}

fn find_import<'a>(idx: &'a SourceIndex, name: &str, from: Option<&str>) -> Option<&'a str> {
    idx.imports
        .iter()
        .filter(|d| from.map_or(true, |m| d.module == m))
        .find(|d| {
            d.bindings
                .iter()
                .any(|b| b.local == name || b.imported == name)
        })
        .map(|d| d.module.as_str())
}

/// Line of the first usage of `call` as an invocation, JSX tag, member
/// chain or object-literal member.
fn find_usage(idx: &SourceIndex, call: &str) -> Option<u32> {
    let target = CallTarget::parse(call);
    if let Some(c) = idx.calls.iter().find(|c| target.matches(&c.callee)) {
        return Some(c.line);
    }
    if let Some(t) = idx.jsx_tags.iter().find(|t| target.matches(&t.path)) {
        return Some(t.line);
    }
    if target.segments.len() < 2 {
        return None;
    }
    if let Some(m) = idx
        .member_chains
        .iter()
        .find(|m| target.contained_in(&m.path))
    {
        return Some(m.line);
    }
    let (owner, key) = match target.segments.as_slice() {
        [.., owner, key] => (owner, key),
        _ => return None,
    };
    idx.objects
        .iter()
        .find(|o| o.bound_to.as_deref() == Some(owner.as_str()) && o.keys.contains(key))
        .map(|o| o.line)
}

fn property_location(idx: &SourceIndex, property: &str, inside_call: &str) -> FileOutcome {
    let target = CallTarget::parse(inside_call);
    let inside = idx.objects.iter().find(|o| {
        o.keys.iter().any(|k| k == property)
            && o
                .argument_of
                .and_then(|(call, _)| idx.calls.get(call))
                .is_some_and(|c| target.matches(&c.callee))
    });
    if let Some(o) = inside {
        return FileOutcome::Pass(format!(
            "'{}' passed to {}() (line {})",
            property, inside_call, o.line
        ));
    }
    if let Some(o) = idx.objects.iter().find(|o| o.keys.iter().any(|k| k == property)) {
        return FileOutcome::NotApplicable(format!(
            "'{}' set outside {}() (line {})",
            property, inside_call, o.line
        ));
    }
    if !idx.calls.iter().any(|c| target.matches(&c.callee)) {
        return FileOutcome::NotApplicable(format!("no call to {}()", inside_call));
    }
    FileOutcome::NotApplicable(format!("'{}' not passed to {}()", property, inside_call))
}

fn named<'a>(idx: &'a SourceIndex, name: Option<&'a str>) -> impl Iterator<Item = &'a FunctionInfo> {
    idx.functions
        .iter()
        .filter(move |f| name.map_or(true, |n| f.name.as_deref() == Some(n)))
}

fn function_flag(
    idx: &SourceIndex,
    name: Option<&str>,
    what: &str,
    flag: impl Fn(&FunctionInfo) -> bool,
) -> FileOutcome {
    let label = name.map_or_else(|| "any function".to_string(), |n| format!("'{}'", n));
    if let Some(f) = named(idx, name).find(|f| flag(f)) {
        return FileOutcome::Pass(format!("{} is {} (line {})", label, what, f.line));
    }
    if named(idx, name).next().is_some() {
        FileOutcome::NotApplicable(format!("{} is not {}", label, what))
    } else {
        FileOutcome::NotApplicable(format!("no function {}", label))
    }
}

fn yield_present(idx: &SourceIndex, name: Option<&str>) -> FileOutcome {
    let hit = match name {
        None => idx.yields.first().map(|(_, line)| *line),
        Some(_) => named(idx, name).find_map(|f| {
            idx.yields
                .iter()
                .find(|(tok, _)| f.contains(*tok))
                .map(|(_, line)| *line)
        }),
    };
    let label = name.map_or_else(String::new, |n| format!(" in '{}'", n));
    match hit {
        Some(line) => FileOutcome::Pass(format!("yield{} (line {})", label, line)),
        None => FileOutcome::NotApplicable(format!("no yield{}", label)),
    }
}

fn type_annotation(idx: &SourceIndex, parameter: &str, annotation: &str) -> FileOutcome {
    let mut seen: Option<String> = None;
    let mut untyped = false;
    for f in &idx.functions {
        for p in &f.params {
            let declared = if p.name == parameter {
                p.type_text.clone()
            } else if p.bindings.iter().any(|b| b == parameter) {
                match p.type_text.as_deref() {
                    Some(t) => type_text::member_type(t, parameter),
                    None => None,
                }
            } else {
                continue;
            };
            match declared {
                Some(t) if type_text::equivalent(&t, annotation) => {
                    return FileOutcome::Pass(format!(
                        "parameter '{}' typed '{}' (line {})",
                        parameter, annotation, f.line
                    ));
                }
                Some(t) => {
                    seen.get_or_insert(t);
                }
                None => untyped = true,
            }
        }
    }
    match seen {
        Some(t) => FileOutcome::NotApplicable(format!(
            "parameter '{}' typed '{}', expected '{}'",
            parameter, t, annotation
        )),
        None if untyped => FileOutcome::NotApplicable(format!(
            "parameter '{}' has no type annotation",
            parameter
        )),
        None => FileOutcome::NotApplicable(format!("no parameter '{}'", parameter)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(src: &str, check: CheckSpec) -> FileOutcome {
        evaluate(&SourceIndex::build(src), &check)
    }

    #[test]
    fn call_target_normalization() {
        assert_eq!(CallTarget::parse("<Suspense />").segments, vec!["Suspense"]);
        assert_eq!(CallTarget::parse("z.string()").segments, vec!["z", "string"]);
        assert_eq!(CallTarget::parse("new Response").segments, vec!["Response"]);
    }

    #[test]
    fn import_from_other_module_reports_actual_source() {
        let out = eval(
            "import { redirect } from 'next/router';",
            CheckSpec::ImportExists {
                name: "redirect".into(),
                from: Some("next/navigation".into()),
                file: None,
            },
        );
        assert_eq!(
            out,
            FileOutcome::NotApplicable(
                "'redirect' is imported from 'next/router', expected 'next/navigation'".into()
            )
        );
    }

    #[test]
    fn object_member_counts_as_usage() {
        let out = eval(
            "export const config = { matcher: ['/dashboard/:path*'] };",
            CheckSpec::CallExists {
                call: "config.matcher".into(),
                file: None,
            },
        );
        assert!(matches!(out, FileOutcome::Pass(_)));
    }

    #[test]
    fn destructured_parameter_member_type() {
        let out = eval(
            "export default async function Page({ params }: { params: Promise<{ slug: string }> }) {}",
            CheckSpec::TypeAnnotation {
                parameter: "params".into(),
                annotation: "Promise<{ slug: string }>".into(),
                file: None,
            },
        );
        assert!(matches!(out, FileOutcome::Pass(_)), "{out:?}");
    }

    #[test]
    fn wrong_type_reports_declared_type() {
        let out = eval(
            "function Page({ params }: { params: { slug: string } }) {}",
            CheckSpec::TypeAnnotation {
                parameter: "params".into(),
                annotation: "Promise<{ slug: string }>".into(),
                file: None,
            },
        );
        assert_eq!(
            out,
            FileOutcome::NotApplicable(
                r#"parameter 'params' typed '{slug:string}', expected 'Promise<{ slug: string }>'"#
                    .into()
            )
        );
    }

    #[test]
    fn yield_scoped_to_named_function() {
        let src = "async function* stream() { yield 1 }\nfunction other() { return 2 }";
        let check = |name: &str| CheckSpec::YieldPresent {
            name: Some(name.into()),
            file: None,
        };
        assert!(matches!(eval(src, check("stream")), FileOutcome::Pass(_)));
        assert!(matches!(eval(src, check("other")), FileOutcome::NotApplicable(_)));
    }
}
