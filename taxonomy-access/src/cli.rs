use crate::config::{AccessConfig, CONFIG_ENV};
use crate::controller::GrantMatrixController;
use crate::err::GrantErr;
use crate::matrix::Submission;
use crate::store::GrantStoreApi;
use crate::types::{CategoryId, SchemeId, TermId, UserId};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "edit per-user taxonomy term access grants", long_about = None)]
pub struct Cli {
    /// yaml configuration file
    #[arg(long, short, env = CONFIG_ENV)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, Subcommand, strum_macros::Display)]
pub enum Command {
    /// create the grant table
    Setup,
    /// print the scheme x term matrix for a user
    Show {
        #[arg(long, short)]
        user: UserId,
    },
    /// print the stored (scheme, term) grants of a user
    List {
        #[arg(long, short)]
        user: UserId,
    },
    Grant {
        #[arg(long, short)]
        user: UserId,
        #[arg(long, short)]
        scheme: SchemeId,
        #[arg(long, short)]
        term: TermId,
    },
    Revoke {
        #[arg(long, short)]
        user: UserId,
        #[arg(long, short)]
        scheme: SchemeId,
        #[arg(long, short)]
        term: TermId,
    },
    /// apply a yaml submission of `scheme: { term: bool }` cells
    Apply {
        #[arg(long, short)]
        user: UserId,
        #[arg(long, short)]
        file: PathBuf,
    },
    /// print one category's terms as select options
    Terms {
        #[arg(long)]
        category: CategoryId,
    },
    /// revoke every grant of a user
    Purge {
        #[arg(long, short)]
        user: UserId,
    },
}

impl Cli {
    pub fn load_config(&self) -> Result<AccessConfig, GrantErr> {
        AccessConfig::load(&self.config)
    }
}

/// run `command` and return what should be printed
pub async fn run(controller: &GrantMatrixController, command: Command) -> Result<String, GrantErr> {
    let mut out = String::new();
    match command {
        Command::Setup => {
            controller.store().setup().await?;
            out.push_str("grant store ready\n");
        }
        Command::Show { user } => {
            let view = controller.build_matrix(&user).await?;
            writeln!(out, "grants for {} ({})", view.user.name, view.user.id).map_err(GrantErr::msg)?;
            out.push_str(view.to_table().as_str());
        }
        Command::List { user } => {
            for (scheme, term) in controller.list_grants(&user).await? {
                writeln!(out, "{}\t{}", scheme, term).map_err(GrantErr::msg)?;
            }
        }
        Command::Grant { user, scheme, term } => {
            let mut submission = Submission::new();
            submission.set(scheme, term, true);
            out.push_str(report(controller, &user, &submission).await?.as_str());
        }
        Command::Revoke { user, scheme, term } => {
            let mut submission = Submission::new();
            submission.set(scheme, term, false);
            out.push_str(report(controller, &user, &submission).await?.as_str());
        }
        Command::Apply { user, file } => {
            let submission = Submission::from_yaml(std::fs::read_to_string(file)?.as_str())?;
            out.push_str(report(controller, &user, &submission).await?.as_str());
        }
        Command::Terms { category } => {
            for (id, label) in controller.term_options(&category).await? {
                let id = id.map(|id| id.to_string()).unwrap_or_default();
                writeln!(out, "{:>6}  {}", id, label).map_err(GrantErr::msg)?;
            }
        }
        Command::Purge { user } => {
            let removed = controller.purge(&user).await?;
            writeln!(out, "revoked {} grant(s)", removed).map_err(GrantErr::msg)?;
        }
    }
    Ok(out)
}

async fn report(
    controller: &GrantMatrixController,
    user: &UserId,
    submission: &Submission,
) -> Result<String, GrantErr> {
    let report = controller.apply_matrix(user, submission).await?;
    let mut out = format!(
        "granted {} revoked {}\n",
        report.granted, report.revoked
    );
    if !report.ignored.is_empty() {
        let ignored = report
            .ignored
            .iter()
            .map(|(scheme, term)| format!("{}:{}", scheme, term))
            .join(", ");
        out.push_str(format!("ignored unknown cells: {}\n", ignored).as_str());
    }
    Ok(out)
}
