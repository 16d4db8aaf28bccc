//! Environment resolution for the child process

use antx_events::{AppEvent, EventEmitter, StepEvent};
use std::collections::HashMap;
use std::path::Path;

use crate::context::StepContext;

/// Variable naming the chosen installation root for the child process
pub const ANT_HOME_VAR: &str = "ANT_HOME";

/// Variable read by Ant's own launcher for extra JVM options
pub const ANT_OPTS_VAR: &str = "ANT_OPTS";

/// Merge the ambient environment with build-scoped variables.
///
/// Build variables win on collision; insertion order of the ambient map is
/// irrelevant since later writes simply replace earlier ones.
#[must_use]
pub fn merge_build_vars(
    ambient: &HashMap<String, String>,
    build_vars: &[(String, String)],
) -> HashMap<String, String> {
    let mut env = ambient.clone();
    for (key, value) in build_vars {
        env.insert(key.clone(), value.clone());
    }
    env
}

/// Finalize the child environment: force `ANT_HOME` to the chosen home (when
/// one was selected) and store the expanded option string under `ANT_OPTS`.
pub fn resolve(
    ctx: &StepContext,
    mut env: HashMap<String, String>,
    home: Option<&Path>,
    ant_opts: Option<&str>,
) -> HashMap<String, String> {
    if let Some(home) = home {
        let value = home.display().to_string();
        env.insert(ANT_HOME_VAR.to_string(), value.clone());
        ctx.emit(AppEvent::Step(StepEvent::EnvironmentChanged {
            session_id: ctx.session_id.clone(),
            variable: ANT_HOME_VAR.to_string(),
            value,
        }));
    }

    if let Some(opts) = ant_opts {
        if !opts.trim().is_empty() {
            let expanded = expand(opts, &env);
            env.insert(ANT_OPTS_VAR.to_string(), expanded.clone());
            ctx.emit(AppEvent::Step(StepEvent::EnvironmentChanged {
                session_id: ctx.session_id.clone(),
                variable: ANT_OPTS_VAR.to_string(),
                value: expanded,
            }));
        }
    }

    env
}

/// Expand `${VAR}` and `$VAR` references against the given environment.
///
/// Unknown references are left verbatim; `$$` is not an escape (the host
/// expands its own macros before the value reaches this crate).
#[must_use]
pub fn expand(input: &str, env: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '$' {
            out.push(ch);
            continue;
        }

        match chars.peek() {
            Some((_, '{')) => {
                let rest = &input[idx + 2..];
                if let Some(close) = rest.find('}') {
                    let name = &rest[..close];
                    match env.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("${");
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    // Skip `{name}`
                    let skip = rest[..close].chars().count() + 2;
                    for _ in 0..skip {
                        chars.next();
                    }
                } else {
                    out.push(ch);
                }
            }
            Some((_, c)) if c.is_ascii_alphanumeric() || *c == '_' => {
                let mut name = String::new();
                while let Some((_, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || *c == '_' {
                        name.push(*c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match env.get(&name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('$');
                        out.push_str(&name);
                    }
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn env_of(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn test_ctx() -> StepContext {
        StepContext::new("job".into(), PathBuf::from("/ws"), PathBuf::from("/rec"))
    }

    #[test]
    fn build_vars_override_ambient() {
        let ambient = env_of(&[("A", "1"), ("B", "2")]);
        let build = vec![("B".to_string(), "3".to_string())];
        let merged = merge_build_vars(&ambient, &build);
        assert_eq!(merged.get("A").unwrap(), "1");
        assert_eq!(merged.get("B").unwrap(), "3");
    }

    #[test]
    fn home_forces_ant_home() {
        let env = env_of(&[(ANT_HOME_VAR, "/old/ant")]);
        let resolved = resolve(&test_ctx(), env, Some(Path::new("/new/ant")), None);
        assert_eq!(resolved.get(ANT_HOME_VAR).unwrap(), "/new/ant");
    }

    #[test]
    fn ant_opts_expanded_against_resolved_env() {
        let env = env_of(&[("MEM", "512m")]);
        let resolved = resolve(&test_ctx(), env, None, Some("-Xmx${MEM} -Dx=$MEM"));
        assert_eq!(resolved.get(ANT_OPTS_VAR).unwrap(), "-Xmx512m -Dx=512m");
    }

    #[test]
    fn blank_ant_opts_sets_nothing() {
        let resolved = resolve(&test_ctx(), HashMap::new(), None, Some("   "));
        assert!(!resolved.contains_key(ANT_OPTS_VAR));
    }

    #[test]
    fn unknown_references_left_verbatim() {
        let env = HashMap::new();
        assert_eq!(expand("a ${MISSING} $GONE b", &env), "a ${MISSING} $GONE b");
        assert_eq!(expand("trailing $", &env), "trailing $");
        assert_eq!(expand("${unterminated", &env), "${unterminated");
    }
}
