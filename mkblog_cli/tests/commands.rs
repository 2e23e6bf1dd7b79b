mod common;

use mkblog_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

#[test]
fn list_prints_every_slug() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("hello  posts/hello.md"))
		.stdout(predicates::str::contains("second  posts/second.md"))
		.stdout(predicates::str::contains("2 document(s)"));

	Ok(())
}

#[test]
fn list_json_is_sorted_by_identifier() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	let output = common::mkblog_cmd()
		.arg("list")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let entries: Value = serde_json::from_slice(&output.stdout)?;
	let slugs: Vec<&str> = entries
		.as_array()
		.ok_or("expected an array")?
		.iter()
		.filter_map(|entry| entry["slug"].as_str())
		.collect();
	assert_eq!(slugs, vec!["hello", "second"]);
	assert_eq!(entries[0]["identifier"], "posts/hello.md");

	Ok(())
}

#[test]
fn list_reports_empty_collection() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "mkblog.toml", "include = \"posts/*.md\"\n")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No documents matched"));

	Ok(())
}

#[test]
fn list_honours_slug_strategy() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "slug = \"mix\"")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::is_match(r"(?m)^hello-[0-9a-z]+  posts/hello\.md$")?);

	Ok(())
}

#[test]
fn html_renders_document() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	common::mkblog_cmd()
		.arg("html")
		.arg("hello")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("<h1>Hello</h1>"))
		.stdout(predicates::str::contains("<p>Some <em>text</em>.</p>"))
		.stdout(predicates::str::contains("title:").not());

	Ok(())
}

#[test]
fn toc_links_to_heading_anchors_when_enabled() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "toc = true")?;

	common::mkblog_cmd()
		.arg("toc")
		.arg("hello")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"<ul class=\"toc\"><li class=\"toc-level-1\"><a href=\"#hello\">Hello</a><ul \
			 class=\"toc\"><li class=\"toc-level-2\"><a href=\"#details\">Details</a></li></ul></li></ul>",
		));

	common::mkblog_cmd()
		.arg("html")
		.arg("hello")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("<h1 id=\"hello\">Hello</h1>"));

	Ok(())
}

#[test]
fn toc_without_plugin_has_empty_fragments() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	common::mkblog_cmd()
		.arg("toc")
		.arg("hello")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("<a href=\"#\">Hello</a>"));

	Ok(())
}

#[test]
fn metadata_prints_validated_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;
	common::write(
		tmp.path(),
		"posts/extra.md",
		"---\ntitle: Extra\ndraft: true\n---\n",
	)?;

	let output = common::mkblog_cmd()
		.arg("metadata")
		.arg("extra")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let metadata: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(metadata, serde_json::json!({ "title": "Extra" }));

	Ok(())
}

#[test]
fn metadata_without_frontmatter_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;
	common::write(tmp.path(), "posts/bare.md", "# No frontmatter\n")?;

	common::mkblog_cmd()
		.arg("metadata")
		.arg("bare")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("metadata not found"));

	Ok(())
}

#[test]
fn unknown_slug_is_an_error() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	common::mkblog_cmd()
		.arg("html")
		.arg("missing")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no document with slug `missing`"));

	Ok(())
}

#[test]
fn check_passes_when_metadata_is_valid() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	common::mkblog_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Check passed: 2 document(s)"));

	Ok(())
}

#[test]
fn check_reports_every_failing_field() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;
	common::write(
		tmp.path(),
		"posts/broken.md",
		"---\ntitle: 3\ntags: [ok, 4]\n---\n",
	)?;
	common::write(tmp.path(), "posts/bare.md", "No frontmatter.\n")?;

	common::mkblog_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("posts/broken.md (broken)"))
		.stderr(predicates::str::contains("`title`: expected string, received number"))
		.stderr(predicates::str::contains("`tags[1]`: expected string, received number"))
		.stderr(predicates::str::contains("posts/bare.md (bare)"))
		.stderr(predicates::str::contains("metadata not found"))
		.stderr(predicates::str::contains("2 of 4 document(s) failed"));

	Ok(())
}

#[test]
fn invalid_glob_is_reported_as_diagnostic() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::write(tmp.path(), "mkblog.toml", "include = \"posts/[.md\"\n")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("mkblog::invalid_pattern"));

	Ok(())
}

#[test]
fn verbose_logs_collection_resolution() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	common::blog(tmp.path(), "")?;

	common::mkblog_cmd()
		.arg("list")
		.arg("--verbose")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("collection resolved"));

	Ok(())
}

#[test]
fn missing_subcommand_exits_with_usage_hint() {
	common::mkblog_cmd()
		.assert()
		.code(1)
		.stderr(predicates::str::contains("mkblog --help"));
}
