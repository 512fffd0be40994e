use normalized_value::{DataNode, Record};

/// Computes the cache identity of a record.
///
/// This is supplied by the cache, which knows which fields identify each type.
/// Implementations must be deterministic, and should return `None` for records
/// that lack a typename or any of their identifying fields.
pub trait IdentityResolver {
    fn identify(&self, record: &Record) -> Option<String>;
}

/// Finds the first candidate with the same identity as `target`.
///
/// A target that can't be identified never matches anything: under-identified
/// data is treated as new rather than risk merging it into the wrong entry.
pub fn find_match<'a, R>(candidates: &'a [DataNode], target: &DataNode, identity: &R) -> Option<&'a DataNode>
where
    R: IdentityResolver + ?Sized,
{
    let target = identity.identify(target.as_record()?)?;

    find_by_identity(candidates, &target, identity)
}

pub(crate) fn find_by_identity<'a, R>(candidates: &'a [DataNode], target: &str, identity: &R) -> Option<&'a DataNode>
where
    R: IdentityResolver + ?Sized,
{
    candidates.iter().find(|candidate| {
        candidate
            .as_record()
            .and_then(|record| identity.identify(record))
            .is_some_and(|candidate| candidate == target)
    })
}
