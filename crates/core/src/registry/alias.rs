use crate::registry::{Erased, InstanceEntry, MarkedType, RejectedAlias};

/// Expands one instance into the table entries of its marked type
pub struct AliasResolver;

impl AliasResolver {
    /// Build the entries for `instance`: one per valid alias in declaration
    /// order, then the marked type's own key.
    ///
    /// An alias equal to the marked type is ignored since the self entry
    /// covers it. An alias whose cast does not accept the instance is
    /// rejected and reported, the remaining aliases still apply.
    pub fn expand(marked: &MarkedType, instance: &Erased) -> (Vec<InstanceEntry>, Vec<RejectedAlias>) {
        let concrete = marked.key();
        let mut entries = Vec::with_capacity(marked.aliases().len() + 1);
        let mut rejected = Vec::new();

        for alias in marked.aliases() {
            if alias.key() == concrete {
                tracing::debug!("Ignoring alias of '{}' to itself", concrete);
                continue;
            }

            match alias.cast(instance) {
                Some(handle) => entries.push(InstanceEntry::new(
                    alias.key(),
                    concrete,
                    instance.clone(),
                    handle,
                )),
                None => {
                    tracing::warn!(
                        "The type '{}' is not assignable to the alias type '{}'",
                        concrete,
                        alias.key()
                    );
                    rejected.push(RejectedAlias {
                        concrete: concrete.name(),
                        alias: alias.key().name(),
                    });
                }
            }
        }

        match marked.cast_self(instance) {
            Some(handle) => entries.push(InstanceEntry::new(
                concrete,
                concrete,
                instance.clone(),
                handle,
            )),
            None => {
                tracing::warn!("Instance does not match its marked type '{}'", concrete);
                rejected.push(RejectedAlias {
                    concrete: concrete.name(),
                    alias: concrete.name(),
                });
            }
        }

        (entries, rejected)
    }
}
