use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};
use splice_core::{ErrorInfo, SpliceError, Untrusted};
use splice_structs::{ByKey, HashTable, IntSet, MinHeap, SearchTree, SortedSeq};
use splice_synth::Alphabet;
use tracing::{debug, warn};

use super::emit;
use crate::config::SpliceConfig;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// YAML script with `signups` and `logouts`.
    #[arg(long)]
    pub script: PathBuf,
    /// Optional YAML configuration.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default)]
    signups: Vec<Signup>,
    #[serde(default)]
    logouts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Signup {
    name: String,
    age: i64,
    #[serde(default)]
    gpa: Option<f64>,
}

#[derive(Debug, Serialize)]
struct NameAge {
    name: String,
    age: Option<i64>,
}

#[derive(Debug, Serialize)]
struct NameGpa {
    name: String,
    gpa: f64,
}

#[derive(Debug, Default, Serialize)]
struct Hidden {
    tree: usize,
    names: usize,
    ages: usize,
    gpas: usize,
    age_set: usize,
}

#[derive(Debug, Serialize)]
struct Listing {
    tree: Vec<NameAge>,
    names: Vec<String>,
    ages: Vec<i64>,
    gpas: Vec<NameGpa>,
    age_set: Vec<i64>,
    hidden: Hidden,
    rejected_signups: Vec<String>,
    unknown_logouts: Vec<String>,
}

/// Every structure the sheet keeps, filled from untrusted form input.
struct Sheet {
    by_name: SearchTree<ByKey<String, i64>>,
    names: SortedSeq<String>,
    ages: MinHeap<i64>,
    gpas: HashTable<String, f64>,
    age_set: IntSet,
    alphabet: Alphabet,
    max_name_len: usize,
}

impl Sheet {
    fn new(config: &SpliceConfig) -> Result<Self, SpliceError> {
        Ok(Self {
            by_name: SearchTree::with_synth(config.synth.clone()),
            names: SortedSeq::with_config(&config.containers, config.synth.clone())?,
            ages: MinHeap::with_synth(config.synth.clone()),
            gpas: HashTable::with_config(&config.containers, config.synth.clone())?,
            age_set: IntSet::with_synth(config.synth.clone()),
            alphabet: config.synth.alphabet()?,
            max_name_len: config.synth.max_string_len,
        })
    }

    /// `true` when `name` lies inside the string domain used on logout.
    fn accepts_name(&self, name: &str) -> bool {
        name.chars().count() <= self.max_name_len
            && name.chars().all(|ch| self.alphabet.contains(ch))
    }

    /// Records one sign-up; `false` when the name is rejected.
    fn sign_up(&mut self, entry: &Signup) -> bool {
        if !self.accepts_name(&entry.name) {
            warn!(
                name = %entry.name,
                max_len = self.max_name_len,
                "sign-up rejected: name outside the configured alphabet or length"
            );
            return false;
        }
        if !self
            .by_name
            .insert(Untrusted::new(entry.name.clone()), entry.age)
        {
            warn!(name = %entry.name, "duplicate sign-up ignored");
            return true;
        }
        self.names.insert(Untrusted::new(entry.name.clone()));
        self.ages.push(Untrusted::new(entry.age));
        if let Some(gpa) = entry.gpa {
            self.gpas.set(Untrusted::new(entry.name.clone()), gpa);
        }
        self.age_set.add(entry.age);
        true
    }

    /// Desensitizes every entry derived from `name`; `false` for unknown users.
    fn log_out(&mut self, name: &str) -> Result<bool, SpliceError> {
        let name = name.to_string();
        let Some(id) = self.by_name.find(&name) else {
            return Ok(false);
        };
        let age = self.by_name.get(&name).copied();
        let mut replaced = self.by_name.synthesize(id)?;
        if let Some(index) = self.names.index_of(&name) {
            replaced &= self.names.synthesize(index)?;
        }
        if let Some(age) = age {
            let slot = self
                .ages
                .iter()
                .position(|item| *item.raw() == age && !item.is_synthesized());
            if let Some(index) = slot {
                replaced &= self.ages.synthesize(index)?;
            }
            let member = self.age_set.iter().position(|member| member == age);
            if let Some(pos) = member {
                if !self.age_set.is_synthesized(pos) {
                    replaced &= self.age_set.synthesize(pos)?;
                }
            }
        }
        if self.gpas.contains_key(&name) {
            replaced &= self.gpas.synthesize(&name)?;
        }
        debug!(name = %name, replaced, "user desensitized");
        Ok(true)
    }

    fn listing(&self, rejected_signups: Vec<String>, unknown_logouts: Vec<String>) -> Listing {
        let mut hidden = Hidden::default();
        let mut tree = Vec::new();
        for id in self.by_name.in_order() {
            let (Ok(key), Ok(age)) = (self.by_name.key(id), self.by_name.value(id)) else {
                continue;
            };
            if key.is_synthesized() {
                hidden.tree += 1;
            } else {
                tree.push(NameAge {
                    name: key.raw().clone(),
                    age: age.copied(),
                });
            }
        }
        let mut names = Vec::new();
        for item in self.names.iter() {
            if item.is_synthesized() {
                hidden.names += 1;
            } else {
                names.push(item.raw().clone());
            }
        }
        let mut ages = Vec::new();
        for item in self.ages.iter() {
            if item.is_synthesized() {
                hidden.ages += 1;
            } else {
                ages.push(*item.raw());
            }
        }
        let mut gpas = Vec::new();
        for (key, gpa) in self.gpas.iter() {
            if key.is_synthesized() {
                hidden.gpas += 1;
            } else {
                gpas.push(NameGpa {
                    name: key.raw().clone(),
                    gpa: *gpa,
                });
            }
        }
        gpas.sort_by(|a, b| a.name.cmp(&b.name));
        let mut age_set = Vec::new();
        for (pos, member) in self.age_set.iter().enumerate() {
            if self.age_set.is_synthesized(pos) {
                hidden.age_set += 1;
            } else {
                age_set.push(member);
            }
        }
        Listing {
            tree,
            names,
            ages,
            gpas,
            age_set,
            hidden,
            rejected_signups,
            unknown_logouts,
        }
    }
}

fn load_script(path: &Path) -> Result<Script, SpliceError> {
    let text = fs::read_to_string(path).map_err(|err| {
        SpliceError::Config(
            ErrorInfo::new("script-read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    serde_yaml::from_str(&text).map_err(|err| {
        SpliceError::Config(
            ErrorInfo::new("script-parse", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

pub fn run(args: &SignupArgs) -> Result<(), Box<dyn Error>> {
    let config = SpliceConfig::load(args.config.as_deref())?;
    let script = load_script(&args.script)?;
    let mut sheet = Sheet::new(&config)?;
    let mut rejected = Vec::new();
    for entry in &script.signups {
        if !sheet.sign_up(entry) {
            rejected.push(entry.name.clone());
        }
    }
    let mut unknown = Vec::new();
    for name in &script.logouts {
        if !sheet.log_out(name)? {
            warn!(name = %name, "logout for unknown user");
            unknown.push(name.clone());
        }
    }
    emit(&sheet.listing(rejected, unknown))?;
    Ok(())
}
