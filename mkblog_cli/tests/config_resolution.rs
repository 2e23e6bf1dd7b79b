mod common;

use mkblog_core::AnyEmptyResult;
use rstest::rstest;

#[rstest]
#[case::root("mkblog.toml")]
#[case::dotfile(".mkblog.toml")]
#[case::config_dir(".config/mkblog.toml")]
fn discovers_config_file(#[case] location: &str) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), location, "include = \"*.md\"\n")?;
	common::write(tmp.path(), "about.md", "# About\n")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("about  about.md"));

	Ok(())
}

#[test]
fn missing_config_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no mkblog.toml found"));

	Ok(())
}

#[test]
fn unknown_config_key_is_rejected() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "mkblog.toml", "include = \"*.md\"\nlayout = \"post\"\n")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("mkblog::config_parse"));

	Ok(())
}

#[test]
fn unknown_slug_strategy_is_rejected() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "mkblog.toml", "include = \"*.md\"\nslug = \"uuid\"\n")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown slug strategy"));

	Ok(())
}

#[test]
fn exclude_patterns_skip_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(
		tmp.path(),
		"mkblog.toml",
		"include = [\"posts/**/*.md\", \"!posts/drafts/**\"]\nexclude = [\"*.wip.md\"]\n",
	)?;
	common::write(tmp.path(), "posts/live.md", "Live\n")?;
	common::write(tmp.path(), "posts/next.wip.md", "WIP\n")?;
	common::write(tmp.path(), "posts/drafts/idea.md", "Idea\n")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("posts/live.md"))
		.stdout(predicates::str::contains("1 document(s)"));

	Ok(())
}
