use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail};
use issue_bridge::{IssueSnapshot, JiraProject, Link, ProjectContext, Settings, State, WebLinkBuilder, logging};
use serde_json::Value;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
	/// TOML settings file; `ISSUE_BRIDGE__*` environment variables override it
	#[arg(long, short)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Print an issue with its labels, links and properties
	Show(IssueArg),
	/// Move an issue to open, resolved or closed
	State(StateArgs),
	/// Post a comment
	Comment(CommentArgs),
	/// Attach a web link
	Link(LinkArgs),
	/// Remove a web link, from both link channels
	Unlink(UnlinkArgs),
	/// Link two issues using a relationship name, e.g. "backport of"
	LinkIssue(LinkIssueArgs),
	#[command(subcommand)]
	Label(LabelCommands),
	/// Set a property; the value is parsed as JSON, falling back to a plain string
	Property(PropertyArgs),
}

#[derive(Args)]
struct IssueArg {
	/// Issue key, e.g. JDK-8272373
	issue: String,
}

#[derive(Args)]
struct StateArgs {
	issue: String,
	/// open | resolved | closed
	state: State,
}

#[derive(Args)]
struct CommentArgs {
	issue: String,
	body: String,
}

#[derive(Args)]
struct LinkArgs {
	issue: String,
	uri: String,
	title: String,
	#[arg(long)]
	summary: Option<String>,
	#[arg(long)]
	relationship: Option<String>,
}

#[derive(Args)]
struct UnlinkArgs {
	issue: String,
	uri: String,
}

#[derive(Args)]
struct LinkIssueArgs {
	issue: String,
	relationship: String,
	target: String,
}

#[derive(Subcommand)]
enum LabelCommands {
	Add { issue: String, label: String },
	Remove { issue: String, label: String },
}

#[derive(Args)]
struct PropertyArgs {
	issue: String,
	name: String,
	value: String,
}

fn main() -> Result<()> {
	color_eyre::install()?;
	let cli = Cli::parse();

	let settings = Settings::load(cli.config.as_deref()).wrap_err("failed to load settings")?;
	logging::init(&settings.log).wrap_err("failed to initialise logging")?;
	let project = JiraProject::connect(&settings)?;

	match cli.command {
		Commands::Show(args) => show(&fetch(&*project, &args.issue)?)?,
		Commands::State(args) => fetch(&*project, &args.issue)?.set_state(args.state)?,
		Commands::Comment(args) => {
			let issue = fetch(&*project, &args.issue)?;
			let comment = issue.add_comment(&args.body)?;
			println!("{}", issue.comment_url(&comment)?);
		}
		Commands::Link(args) => {
			let mut builder = WebLinkBuilder::parse(&args.uri, args.title)?;
			if let Some(summary) = args.summary {
				builder = builder.summary(summary);
			}
			if let Some(relationship) = args.relationship {
				builder = builder.relationship(relationship);
			}
			fetch(&*project, &args.issue)?.add_link(&builder.into())?;
		}
		Commands::Unlink(args) => {
			// Removal matches on the uri alone.
			let link: Link = WebLinkBuilder::parse(&args.uri, "")?.into();
			fetch(&*project, &args.issue)?.remove_link(&link)?;
		}
		Commands::LinkIssue(args) => {
			let target = fetch(&*project, &args.target)?;
			fetch(&*project, &args.issue)?.add_link(&Link::issue(target, args.relationship))?;
		}
		Commands::Label(LabelCommands::Add { issue, label }) => fetch(&*project, &issue)?.add_label(&label)?,
		Commands::Label(LabelCommands::Remove { issue, label }) => fetch(&*project, &issue)?.remove_label(&label)?,
		Commands::Property(args) => {
			let value = serde_json::from_str(&args.value).unwrap_or(Value::String(args.value));
			fetch(&*project, &args.issue)?.set_property(&args.name, &value)?;
		}
	}

	Ok(())
}

fn fetch(project: &dyn ProjectContext, id: &str) -> Result<IssueSnapshot> {
	match project.issue(id)? {
		Some(issue) => Ok(issue),
		None => bail!("issue {id} does not exist"),
	}
}

fn show(issue: &IssueSnapshot) -> Result<()> {
	println!("{} [{}] {}", issue.id(), issue.status(), issue.title());
	println!("{}", issue.web_url()?);
	if !issue.body().is_empty() {
		println!("\n{}\n", issue.body());
	}

	let labels = issue.labels()?;
	if !labels.is_empty() {
		println!("labels: {}", labels.join(", "));
	}
	for (name, value) in issue.properties() {
		println!("{name}: {value}");
	}
	for link in issue.links()? {
		match link {
			Link::Web(web) => println!("link: {} <{}>", web.title(), web.uri()),
			Link::Issue(linked) => println!("{}: {} {}", linked.relationship(), linked.issue().id(), linked.issue().title()),
		}
	}
	for comment in issue.comments()? {
		println!("--- {} ({})\n{}", comment.author.full_name, comment.created_at, comment.body);
	}
	Ok(())
}
