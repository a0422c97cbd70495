//! Tunables for the allocator and its analyses.
//!
//! Unlike the teacher's `Options`, there is no single process-wide instance
//! to hang this off (no `MMTk` struct here): a `CoreOptions` is constructed
//! explicitly by whoever sets up the runtime and threaded through. Fields
//! are still overridable from `LISPMEM_*`-prefixed environment variables,
//! matching `read_env_var_settings` in the teacher's options module.

use std::fmt::Debug;

use strum_macros::EnumString;

/// Resolution of the scc_id-merge Open Question (spec §9): whether two
/// independently-constructed subgraphs that later link must share an
/// scc_id before the first collection that can see both.
#[derive(Copy, Clone, Eq, PartialEq, EnumString, Debug)]
pub enum SccMergePolicy {
    /// Merge scc_ids eagerly, the moment a strong edge crosses two
    /// previously-distinct ids. Keeps every collection sound but adds a
    /// union-find step to every strong write.
    Eager,
    /// Leave scc_ids as assigned at allocation and let collection discover
    /// the true partition via the mark phase. Cheaper per write; an object
    /// can transiently sit in the wrong collection group between safe
    /// points.
    Lazy,
}

/// An option of a given type, with a validator and a flag for whether it
/// may be set from the environment. Mirrors `MMTKOption<T>` in spirit; we
/// drop the command-line-settable flag since this crate has no CLI.
#[derive(Clone)]
pub struct CoreOption<T: Debug + Clone> {
    value: T,
    validator: fn(&T) -> bool,
    from_env_var: bool,
}

impl<T: Debug + Clone> CoreOption<T> {
    fn new(value: T, validator: fn(&T) -> bool, from_env_var: bool) -> Self {
        CoreOption {
            value,
            validator,
            from_env_var,
        }
    }

    /// Set the option to `value`. Returns true if `value` passed validation
    /// and was applied.
    pub fn set(&mut self, value: T) -> bool {
        if (self.validator)(&value) {
            self.value = value;
            true
        } else {
            false
        }
    }
}

impl<T: Debug + Clone> std::ops::Deref for CoreOption<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.value
    }
}

fn always_valid<T>(_: &T) -> bool {
    true
}

fn positive_usize(v: &usize) -> bool {
    *v > 0
}

fn power_of_two(v: &usize) -> bool {
    *v > 0 && (*v & (*v - 1)) == 0
}

macro_rules! core_options {
    ($($(#[$attr:meta])* $name:ident: $type:ty[env_var: $env_var:expr][$validator:expr] = $default:expr),* $(,)?) => {
        /// Tunables consulted by the arena, the deferred-RC queue and the
        /// SCC collector. Construct with [`CoreOptions::default`] and
        /// override with [`CoreOptions::read_env_var_settings`].
        #[derive(Clone)]
        pub struct CoreOptions {
            $($(#[$attr])* pub $name: CoreOption<$type>),*
        }

        impl CoreOptions {
            fn set_from_env_var(&mut self, key: &str, val: &str) -> bool {
                match key {
                    $(stringify!($name) => {
                        assert!(self.$name.from_env_var, "cannot set option {key} from an env var");
                        if let Ok(typed) = val.parse::<$type>() {
                            let ok = self.$name.set(typed);
                            if !ok {
                                eprintln!("Warn: unable to set {key}={val:?}: invalid value, keeping default");
                            }
                            ok
                        } else {
                            eprintln!("Warn: unable to set {key}={val:?}: could not parse, keeping default");
                            false
                        }
                    })*
                    _ => false,
                }
            }

            /// Scan `LISPMEM_*` environment variables and apply any that
            /// match a known tunable (case-insensitively, after stripping
            /// the prefix), the same way the teacher scans `MMTK_*`.
            pub fn read_env_var_settings(&mut self) {
                const PREFIX: &str = "LISPMEM_";
                for (key, val) in std::env::vars() {
                    if let Some(rest) = key.strip_prefix(PREFIX) {
                        let lowercase = rest.to_lowercase();
                        match lowercase.as_str() {
                            $(stringify!($name) => { self.set_from_env_var(&lowercase, &val); },)*
                            _ => {}
                        }
                    }
                }
            }

            fn new() -> Self {
                CoreOptions {
                    $($name: CoreOption::new($default, $validator, $env_var)),*
                }
            }
        }

        impl Default for CoreOptions {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

core_options! {
    /// Deferred-RC queue drain size per safe point (spec §"Deferred-RC
    /// entry" and `process_deferred`).
    batch_size: usize [env_var: true][positive_usize] = 32,
    /// Work units an SCC collection pass may spend before yielding to the
    /// next safe point (spec "Bound").
    budget: usize [env_var: true][positive_usize] = 4096,
    /// Pages to commit ahead of the bump pointer when the arena's medium
    /// path extends a chunk.
    vmem_commit_ahead: usize [env_var: true][positive_usize] = 4,
    /// Bytes of virtual address space reserved per arena at construction.
    /// Default 2 MiB, THP-aligned on Linux.
    default_reserve: usize [env_var: true][power_of_two] = 1 << 21,
    /// Bytes committed eagerly when an arena is constructed, before any
    /// allocation forces the medium path.
    initial_commit: usize [env_var: true][power_of_two] = 1 << 20,
    /// Allocation sizes at or above this use huge pages where the platform
    /// supports it, instead of the default page size.
    hugepage_threshold: usize [env_var: true][power_of_two] = 2 << 20,
    /// Resolution of the scc_id-merge Open Question; see [`SccMergePolicy`].
    scc_merge_policy: SccMergePolicy [env_var: true][always_valid] = SccMergePolicy::Lazy,
    /// Whether the tether cache (spec: "shows no speedup in benchmarks")
    /// is enabled. Opt-in so the ablation in spec §9 is a one-flag flip.
    tether_cache: bool [env_var: true][always_valid] = false,
}
