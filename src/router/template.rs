use super::core::ParamVec;
use crate::error::CompileError;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// One `/`-separated piece of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matches its text exactly
    Literal(String),
    /// `{name}` filling the whole segment
    Param(Arc<str>),
    /// `prefix{name}suffix`; at least one of prefix and suffix is non-empty
    Mixed {
        prefix: String,
        name: Arc<str>,
        suffix: String,
    },
}

impl Segment {
    /// Parameter bound by this segment, if any
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Param(name) | Segment::Mixed { name, .. } => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(text) => write!(f, "{text}"),
            Segment::Param(name) => write!(f, "{{{name}}}"),
            Segment::Mixed {
                prefix,
                name,
                suffix,
            } => write!(f, "{prefix}{{{name}}}{suffix}"),
        }
    }
}

/// Result of matching one request path against one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Every segment matched; captured parameters in template order
    Matched(ParamVec),
    /// A mixed segment matched its prefix but not its suffix (400)
    StructuralMismatch {
        /// Index of the first offending segment
        segment: usize,
    },
    /// The path is not an instance of this template (404)
    NoMatch,
}

/// A parsed path template such as `/path/to/{param}/resours{suffix}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    raw: String,
    segments: Vec<Segment>,
}

fn invalid(template: &str, reason: impl Into<String>) -> CompileError {
    CompileError::InvalidRouteTemplate {
        template: template.to_string(),
        reason: reason.into(),
    }
}

fn parse_segment(template: &str, segment: &str) -> Result<Segment, CompileError> {
    let opens = segment.matches('{').count();
    let closes = segment.matches('}').count();
    if opens == 0 && closes == 0 {
        return Ok(Segment::Literal(segment.to_string()));
    }
    if opens != closes {
        return Err(invalid(template, format!("unbalanced braces in segment '{segment}'")));
    }
    if opens > 1 {
        return Err(invalid(
            template,
            format!("more than one parameter in segment '{segment}'"),
        ));
    }
    let (Some(open), Some(close)) = (segment.find('{'), segment.find('}')) else {
        return Err(invalid(template, format!("unbalanced braces in segment '{segment}'")));
    };
    if close < open {
        return Err(invalid(template, format!("unbalanced braces in segment '{segment}'")));
    }
    let name = &segment[open + 1..close];
    if name.trim().is_empty() {
        return Err(invalid(template, "empty parameter name"));
    }
    let prefix = &segment[..open];
    let suffix = &segment[close + 1..];
    let name: Arc<str> = Arc::from(name);
    if prefix.is_empty() && suffix.is_empty() {
        Ok(Segment::Param(name))
    } else {
        Ok(Segment::Mixed {
            prefix: prefix.to_string(),
            name,
            suffix: suffix.to_string(),
        })
    }
}

impl RouteTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidRouteTemplate`] when the template does
    /// not start with `/`, a segment holds two placeholders, braces are
    /// unbalanced or a placeholder name is empty.
    pub fn parse(template: &str) -> Result<Self, CompileError> {
        let Some(rest) = template.strip_prefix('/') else {
            return Err(invalid(template, "template must start with '/'"));
        };
        let segments = rest
            .split('/')
            .map(|s| parse_segment(template, s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RouteTemplate {
            raw: template.to_string(),
            segments,
        })
    }

    /// The template as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all placeholders in template order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::param_name)
    }

    /// Match a request path (base path already stripped, no query string).
    ///
    /// Segment counts must agree. Literals compare exactly. A parameter binds
    /// the request segment verbatim and never binds an empty string. A mixed
    /// segment needs its prefix, a non-empty middle and its exact suffix:
    /// a missing prefix or empty middle is [`MatchOutcome::NoMatch`], a wrong
    /// suffix is [`MatchOutcome::StructuralMismatch`]. Any `NoMatch` segment
    /// outranks a structural mismatch elsewhere in the same path.
    #[must_use]
    pub fn matches(&self, path: &str) -> MatchOutcome {
        let Some(rest) = path.strip_prefix('/') else {
            return MatchOutcome::NoMatch;
        };
        let parts: SmallVec<[&str; 16]> = rest.split('/').collect();
        if parts.len() != self.segments.len() {
            return MatchOutcome::NoMatch;
        }

        let mut params = ParamVec::new();
        let mut mismatch = None;
        for (idx, (segment, part)) in self.segments.iter().zip(parts.iter()).enumerate() {
            match segment {
                Segment::Literal(text) => {
                    if text != part {
                        return MatchOutcome::NoMatch;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return MatchOutcome::NoMatch;
                    }
                    params.push((Arc::clone(name), (*part).to_string()));
                }
                Segment::Mixed {
                    prefix,
                    name,
                    suffix,
                } => {
                    let Some(after_prefix) = part.strip_prefix(prefix.as_str()) else {
                        return MatchOutcome::NoMatch;
                    };
                    if after_prefix.is_empty() {
                        return MatchOutcome::NoMatch;
                    }
                    match after_prefix.strip_suffix(suffix.as_str()) {
                        Some("") => return MatchOutcome::NoMatch,
                        Some(middle) => params.push((Arc::clone(name), middle.to_string())),
                        None => {
                            mismatch.get_or_insert(idx);
                        }
                    }
                }
            }
        }
        match mismatch {
            Some(segment) => MatchOutcome::StructuralMismatch { segment },
            None => MatchOutcome::Matched(params),
        }
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
