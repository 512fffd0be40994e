use std::cell::OnceCell;

use cache_reconcile::Modifier;
use normalized_value::DataNode;
use runtime::{
    cache::{FragmentSelector, NormalizedCache},
    selection::{FragmentDocument, Variables},
};

use super::{reconcile_cached, DataBuilder, DataShape};
use crate::{
    build_fragment, create_updater, select_fragment, MutationResult, MutationUpdater, OptionsSet, Result,
    UpdaterOptions,
};

/// Reads a record through a fragment, reconciles it with the modifier built by
/// `data` and writes the result back. Records that aren't cached are left alone.
///
/// Without an id or a fragment, `data` is first called with an empty record. The
/// fragment selects every field it names, and the record is identified from the
/// fields that produced a value.
pub struct ModifyFragmentOptions {
    pub id: Option<String>,
    pub fragment: Option<FragmentDocument>,
    pub fragment_name: Option<String>,
    pub variables: Variables,
    pub data: DataBuilder,
    /// Whether to read optimistic data, `true` by default
    pub optimistic: bool,
    pub skip: bool,
}

impl ModifyFragmentOptions {
    pub fn new(data: impl Fn(&DataNode) -> Modifier + 'static) -> Self {
        ModifyFragmentOptions {
            id: None,
            fragment: None,
            fragment_name: None,
            variables: Variables::new(),
            data: Box::new(data),
            optimistic: true,
            skip: false,
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn fragment(mut self, fragment: FragmentDocument) -> Self {
        self.fragment = Some(fragment);
        self
    }

    #[must_use]
    pub fn fragment_name(mut self, fragment_name: impl Into<String>) -> Self {
        self.fragment_name = Some(fragment_name.into());
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn optimistic(mut self, optimistic: bool) -> Self {
        self.optimistic = optimistic;
        self
    }

    #[must_use]
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }
}

impl std::fmt::Debug for ModifyFragmentOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifyFragmentOptions")
            .field("id", &self.id)
            .field("fragment", &self.fragment)
            .field("fragment_name", &self.fragment_name)
            .field("variables", &self.variables)
            .field("optimistic", &self.optimistic)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl UpdaterOptions for ModifyFragmentOptions {
    fn skip(&self) -> bool {
        self.skip
    }
}

pub fn apply(cache: &mut dyn NormalizedCache, options: ModifyFragmentOptions) -> Result<()> {
    let shape_cell = OnceCell::new();
    let shape = || shape_cell.get_or_init(|| DataShape::of(&options.data));

    let document = match options.fragment {
        Some(document) => document,
        None => build_fragment(&shape().data())?,
    };
    let fragment = select_fragment(&document, options.fragment_name.as_deref())?;
    let id = match options.id {
        Some(id) => id,
        None => shape().identify(&*cache)?,
    };

    let selector = FragmentSelector {
        id: &id,
        fragment,
        variables: &options.variables,
    };

    let Some(cached) = cache.read_fragment(&selector, options.optimistic)? else {
        tracing::debug!(%id, fragment = %fragment.name, "fragment is not cached, nothing to modify");
        return Ok(());
    };

    let data = reconcile_cached(&*cache, &cached, &options.data);
    cache.write_fragment(&selector, data)?;

    Ok(())
}

pub fn modify_fragment<B>(builder: B) -> MutationUpdater
where
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<ModifyFragmentOptions> + 'static,
{
    create_updater(apply, builder)
}
