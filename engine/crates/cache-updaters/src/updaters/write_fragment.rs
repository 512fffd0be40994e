use normalized_value::DataNode;
use runtime::{
    cache::{FragmentSelector, NormalizedCache},
    selection::{FragmentDocument, Variables},
};

use crate::{
    build_fragment, create_updater, select_fragment, MutationResult, MutationUpdater, OptionsSet, Result,
    UpdaterOptions,
};

/// Writes data to a single record. The fragment is built from the data when none is
/// given, and the record is identified from the data when no id is given.
#[derive(Clone, Debug)]
pub struct WriteFragmentOptions {
    pub id: Option<String>,
    pub fragment: Option<FragmentDocument>,
    /// Picks the fragment to write when the document holds several
    pub fragment_name: Option<String>,
    pub variables: Variables,
    pub data: DataNode,
    pub skip: bool,
}

impl WriteFragmentOptions {
    pub fn new(data: impl Into<DataNode>) -> Self {
        WriteFragmentOptions {
            id: None,
            fragment: None,
            fragment_name: None,
            variables: Variables::new(),
            data: data.into(),
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
}

impl UpdaterOptions for WriteFragmentOptions {
    fn skip(&self) -> bool {
        self.skip
    }
}

pub fn apply(cache: &mut dyn NormalizedCache, options: WriteFragmentOptions) -> Result<()> {
    let document = match options.fragment {
        Some(document) => document,
        None => build_fragment(&options.data)?,
    };
    let fragment = select_fragment(&document, options.fragment_name.as_deref())?;
    let id = match options.id {
        Some(id) => id,
        None => super::identify(&*cache, &options.data)?,
    };

    tracing::trace!(%id, fragment = %fragment.name, "writing fragment");

    let selector = FragmentSelector {
        id: &id,
        fragment,
        variables: &options.variables,
    };
    cache.write_fragment(&selector, options.data)?;

    Ok(())
}

pub fn write_fragment<B>(builder: B) -> MutationUpdater
where
    B: Fn(&MutationResult, &dyn NormalizedCache) -> OptionsSet<WriteFragmentOptions> + 'static,
{
    create_updater(apply, builder)
}
