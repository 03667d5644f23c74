use anyhow::{Context as _, Result};
use cmdtree::{ArgFields, Application, Argument, Command, Context};

const QUARTERS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];

/// The demo tree: a default `report` command, a `team` router and `schema`.
pub fn build_app() -> Result<Application> {
    let mut app = Application::builder("cmdtree")
        .description("Quarterly reporting demo for cmdtree.")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(Argument::bool(ArgFields {
            alias: "v".to_string(),
            description: "Log what the command is doing.".to_string(),
            default: "false".to_string(),
            ..ArgFields::named("verbose")
        })?)
        .command(report()?)
        .command(team()?)
        .command(
            Command::builder("schema")
                .description("Print the command tree as JSON.")
                .build()?,
        )
        .build()?;

    let json = app.schema().to_json()?;
    app.commands_mut()
        .get_mut("schema")
        .context("schema command is not registered")?
        .set_exec(move |_| {
            println!("{json}");
            Ok(())
        });

    Ok(app)
}

fn report() -> Result<Command> {
    let cmd = Command::builder("report")
        .alias("r")
        .description("Summarize a quarter.")
        .default(true)
        .arg(Argument::string(ArgFields {
            alias: "q".to_string(),
            description: "Fiscal quarter.".to_string(),
            required: true,
            choices: QUARTERS.map(String::from).to_vec(),
            ..ArgFields::named("quarter")
        })?)
        .arg(Argument::int(ArgFields {
            alias: "e".to_string(),
            description: "Head count.".to_string(),
            required: true,
            ..ArgFields::named("employees")
        })?)
        .arg(Argument::float(ArgFields {
            description: "Bonus per employee.".to_string(),
            default: "0".to_string(),
            ..ArgFields::named("bonus")
        })?)
        .arg(Argument::bool(ArgFields {
            description: "Whether the team works remotely.".to_string(),
            default: "false".to_string(),
            ..ArgFields::named("remote")
        })?)
        .arg(Argument::string(ArgFields {
            description: "Labels for the report.".to_string(),
            multiple: true,
            ..ArgFields::named("tags")
        })?)
        .exec(run_report)
        .build()?;
    Ok(cmd)
}

fn run_report(ctx: &Context<'_>) -> Result<()> {
    let quarter = ctx.args.as_string("quarter")?;
    let employees = ctx.args.as_int("employees")?;
    let bonus = ctx.args.as_float("bonus")?;
    let remote = ctx.args.as_bool("remote")?;

    if ctx.globals.as_bool("verbose").unwrap_or_default() {
        tracing::info!(quarter, employees, "building report");
    }

    println!("report {quarter}: {employees} employees");
    println!("bonus pool: {:.2}", bonus * employees as f64);
    println!("remote: {remote}");
    if let Ok(tags) = ctx.args.as_strings("tags") {
        println!("tags: {}", tags.join(", "));
    }
    Ok(())
}

fn team() -> Result<Command> {
    let members = || {
        Argument::string(ArgFields {
            alias: "m".to_string(),
            description: "Team members.".to_string(),
            multiple: true,
            ..ArgFields::named("members")
        })
    };

    let list = Command::builder("list")
        .alias("ls")
        .description("Print one member per line.")
        .default(true)
        .arg(members()?)
        .exec(|ctx| {
            match ctx.args.as_strings("members") {
                Ok(members) => members.iter().for_each(|m| println!("{m}")),
                Err(_) => println!("no members"),
            }
            Ok(())
        })
        .build()?;

    let count = Command::builder("count")
        .description("Print the number of members.")
        .arg(members()?)
        .exec(|ctx| {
            let count = ctx.args.as_strings("members").map_or(0, <[String]>::len);
            println!("{count}");
            Ok(())
        })
        .build()?;

    let cmd = Command::builder("team")
        .description("Work with team member lists.")
        .subcommand(list)
        .subcommand(count)
        .build()?;
    Ok(cmd)
}
