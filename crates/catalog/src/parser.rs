//! Parser for catalog data files.
//!
//! Two `::`-delimited text files make up a catalog:
//! - contents.dat: contentId::marketplaceId::renderableData
//! - targeting_groups.dat: targetingGroupId::contentId::clickThroughRate::predicates
//!
//! `predicates` is a comma-separated list of `[!]kind[=arg|arg...]` tokens:
//! - `always` / `never`
//! - `recognized`
//! - `marketplace=US|CA`
//! - `customer=c-1|c-2`
//!
//! A leading `!` inverts the predicate. Blank lines and `#` comments are skipped.

use crate::error::{CatalogError, Result};
use crate::types::AdvertisementContent;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use targeting::predicates::{
    ConstantPredicate, CustomerPredicate, InvertedPredicate, MarketplacePredicate,
    RecognizedCustomerPredicate,
};
use targeting::{TargetingGroup, TargetingPredicate};

const FIELD_SEPARATOR: &str = "::";

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })
}

/// Yields (line number, line) for every line carrying data.
///
/// Lines are not trimmed; only key fields are, so renderable data passes
/// through exactly as written.
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
}

fn require_non_empty(value: &str, file: &str, line: usize, field: &str) -> Result<String> {
    if value.is_empty() {
        return Err(CatalogError::ParseError {
            file: file.to_string(),
            line,
            reason: format!("Missing {}", field),
        });
    }
    Ok(value.to_string())
}

// =============================================================================
// contents.dat
// =============================================================================

/// Parse the contents.dat file
pub fn parse_contents(path: &Path) -> Result<Vec<AdvertisementContent>> {
    let content = read_file(path)?;
    parse_contents_str(&content)
}

pub fn parse_contents_str(content: &str) -> Result<Vec<AdvertisementContent>> {
    const FILE: &str = "contents.dat";
    let mut contents = Vec::new();

    for (line_no, line) in data_lines(content) {
        // Renderable data is the remainder and may itself contain "::"
        let parts: Vec<&str> = line.splitn(3, FIELD_SEPARATOR).collect();
        if parts.len() != 3 {
            return Err(CatalogError::FieldCountMismatch {
                expected: 3,
                found: parts.len(),
                line: line_no,
            });
        }

        contents.push(AdvertisementContent {
            content_id: require_non_empty(parts[0].trim(), FILE, line_no, "contentId")?,
            marketplace_id: require_non_empty(parts[1].trim(), FILE, line_no, "marketplaceId")?,
            renderable_data: parts[2].to_string(),
        });
    }

    Ok(contents)
}

// =============================================================================
// targeting_groups.dat
// =============================================================================

/// Parse the targeting_groups.dat file
pub fn parse_targeting_groups(path: &Path) -> Result<Vec<TargetingGroup>> {
    let content = read_file(path)?;
    parse_targeting_groups_str(&content)
}

pub fn parse_targeting_groups_str(content: &str) -> Result<Vec<TargetingGroup>> {
    const FILE: &str = "targeting_groups.dat";
    let mut groups = Vec::new();

    for (line_no, line) in data_lines(content) {
        let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if parts.len() != 4 {
            return Err(CatalogError::FieldCountMismatch {
                expected: 4,
                found: parts.len(),
                line: line_no,
            });
        }

        let targeting_group_id = require_non_empty(parts[0].trim(), FILE, line_no, "targetingGroupId")?;
        let content_id = require_non_empty(parts[1].trim(), FILE, line_no, "contentId")?;
        let click_through_rate: f64 = parts[2].trim().parse().map_err(|_| CatalogError::ParseError {
            file: FILE.to_string(),
            line: line_no,
            reason: format!("Invalid clickThroughRate '{}'", parts[2].trim()),
        })?;

        let mut group = TargetingGroup::new(targeting_group_id, content_id, click_through_rate);
        for token in parts[3].split(',').map(str::trim).filter(|t| !t.is_empty()) {
            group = group.with_shared_predicate(parse_predicate(token, line_no)?);
        }
        groups.push(group);
    }

    Ok(groups)
}

/// Build a predicate from a `[!]kind[=arg|arg...]` token
fn parse_predicate(token: &str, line: usize) -> Result<Arc<dyn TargetingPredicate>> {
    let (inverse, body) = match token.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, token),
    };
    let (kind, args) = match body.split_once('=') {
        Some((kind, args)) => (kind.trim(), Some(args)),
        None => (body, None),
    };
    let args: Vec<&str> = args
        .map(|a| a.split('|').map(str::trim).filter(|a| !a.is_empty()).collect())
        .unwrap_or_default();

    let missing_args = || CatalogError::ParseError {
        file: "targeting_groups.dat".to_string(),
        line,
        reason: format!("Predicate '{}' needs at least one argument", kind),
    };

    let predicate: Arc<dyn TargetingPredicate> = match kind {
        "always" => Arc::new(ConstantPredicate::always()),
        "never" => Arc::new(ConstantPredicate::never()),
        "recognized" => Arc::new(RecognizedCustomerPredicate),
        "marketplace" if args.is_empty() => return Err(missing_args()),
        "marketplace" => Arc::new(MarketplacePredicate::new(args)),
        "customer" if args.is_empty() => return Err(missing_args()),
        "customer" => Arc::new(CustomerPredicate::new(args)),
        other => {
            return Err(CatalogError::UnknownPredicate {
                kind: other.to_string(),
                line,
            });
        }
    };

    if inverse {
        Ok(Arc::new(InvertedPredicate::from_shared(predicate)))
    } else {
        Ok(predicate)
    }
}
