//! End-to-end CLI test suite.
//!
//! Tests organized by command group. Each test verifies CLI behavior
//! through the public interface.

mod common;

use common::harness::{TestEnv, TestNote};
use common::{png_bytes, zip_entries};
use predicates::prelude::*;
use serde_json::Value;

fn biology() -> TestNote {
    TestNote::new("Cell Biology")
        .summary("How cells are built")
        .section("Membrane", "A lipid **bilayer**.\n\n- proteins\n- cholesterol")
        .section("Nucleus", "Holds the DNA. See [[Genetics]].")
}

// ===========================================
// export command tests
// ===========================================
mod export_tests {
    use super::*;

    #[test]
    fn test_export_pdf_writes_slugged_file() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        env.export("bio")
            .assert()
            .success()
            .stdout(predicate::str::contains("Exported 'Cell Biology'"));

        let pdf = env.out_dir().join("cell-biology.pdf");
        assert!(pdf.is_file());
        let bytes = std::fs::read(pdf).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_export_accepts_path_with_extension() {
        let env = TestEnv::new();
        let path = env.add_note("bio", &biology());

        env.export(&path.to_string_lossy()).assert().success();
        assert!(env.out_dir().join("cell-biology.pdf").is_file());
    }

    #[test]
    fn test_export_anki_writes_zip() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        env.export("bio")
            .anki()
            .assert()
            .success()
            .stdout(predicate::str::contains("3 cards"));

        let outputs = env.outputs();
        assert_eq!(outputs.len(), 1);
        let name = outputs[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("cell-biology-anki-"), "got {name}");
        assert!(name.ends_with(".zip"));

        let entries = zip_entries(&std::fs::read(&outputs[0]).unwrap());
        assert!(entries.contains(&"cards.txt".to_string()));
        assert!(entries.contains(&"README.txt".to_string()));
    }

    #[test]
    fn test_export_json_output() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        let json: Value = env.export("bio").cli_json().output_json();
        assert_eq!(json["data"]["title"], "Cell Biology");
        assert_eq!(json["data"]["format"], "pdf");
        assert!(json["data"]["units"].as_u64().unwrap() >= 1);
        assert!(json["data"].get("images").is_none());
    }

    #[test]
    fn test_export_paths_output() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        env.export("bio")
            .args(["--cli-format", "paths"])
            .assert()
            .success()
            .stdout(predicate::str::ends_with("cell-biology.pdf\n"));
    }

    #[test]
    fn test_export_without_sections_fails() {
        let env = TestEnv::new();
        env.write_note("loose", "---\ntitle: Loose\n---\nno headings here\n");

        env.export("loose")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error:"))
            .stderr(predicate::str::contains("no sections"));
        assert!(env.outputs().is_empty());
    }

    #[test]
    fn test_export_missing_note_fails() {
        let env = TestEnv::new();

        env.export("ghost")
            .assert()
            .failure()
            .stderr(predicate::str::contains("note not found"));
    }

    #[test]
    fn test_export_unknown_style_falls_back() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        env.export("bio")
            .args(["--style", "comic"])
            .assert()
            .success()
            .stderr(predicate::str::contains("comic"));
        assert!(env.out_dir().join("cell-biology.pdf").is_file());
    }

    #[test]
    fn test_export_embeds_stored_image() {
        let env = TestEnv::new();
        let image = env.write_file("figure.png", &png_bytes(8, 4));

        let json: Value = env
            .cmd()
            .args(["image", "add", image.to_string_lossy().as_ref(), "--format", "json"])
            .output_json();
        let markdown = json["data"]["markdown"].as_str().unwrap().to_string();

        env.add_note(
            "fig",
            &TestNote::new("Figures").section("Diagram", &format!("Caption\n\n{markdown}")),
        );
        let json: Value = env.export("fig").anki().cli_json().output_json();
        assert_eq!(json["data"]["images"], 1);
    }

    #[test]
    fn test_export_offline_skips_url_images() {
        let env = TestEnv::new();
        env.add_note(
            "web",
            &TestNote::new("Web").section("Figure", "Text\n\n![x](https://img.invalid/x.png)"),
        );

        let json: Value = env
            .export("web")
            .anki()
            .args(["--offline"])
            .cli_json()
            .output_json();
        assert_eq!(json["data"]["units"], 1);
        assert_eq!(json["data"]["images"], 0);
    }

    #[test]
    fn test_export_all_skips_failures() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());
        env.add_note("chem", &TestNote::new("Chemistry").section("Bonds", "Covalent"));
        env.write_note("empty", "nothing to export\n");
        env.write_file(".hidden/secret.md", b"# Hidden\ntext");

        let json: Value = env.export_all().cli_json().output_json();
        assert_eq!(json["data"]["exported"].as_array().unwrap().len(), 2);
        let failed = json["data"]["failed"].as_array().unwrap();
        assert_eq!(failed.len(), 1);
        assert!(failed[0]["source"].as_str().unwrap().ends_with("empty.md"));

        assert!(env.out_dir().join("cell-biology.pdf").is_file());
        assert!(env.out_dir().join("chemistry.pdf").is_file());
        assert!(!env.out_dir().join("hidden.pdf").exists());
    }

    #[test]
    fn test_export_all_fails_when_nothing_exports() {
        let env = TestEnv::new();
        env.write_note("empty", "no headings\n");

        env.export_all()
            .assert()
            .failure()
            .stderr(predicate::str::contains("could be exported"));
    }

    #[test]
    fn test_export_requires_note_or_all() {
        let env = TestEnv::new();
        env.cmd().args(["export"]).assert().failure();
    }

    #[test]
    fn test_config_sets_output_and_layout() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());
        let out = env.notes_dir().join("exports");
        env.write_config(&format!(
            "output = {:?}\nstyle = \"serif\"\n\n[pdf]\npage_width = 612.0\npage_height = 792.0\n",
            out.to_string_lossy()
        ));

        env.cmd().export("bio").assert().success();
        assert!(out.join("cell-biology.pdf").is_file());
    }

    #[test]
    fn test_invalid_config_layout_is_reported() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());
        env.write_config("[pdf]\nkey_column_width = 900.0\n");

        env.export("bio")
            .assert()
            .failure()
            .stderr(predicate::str::contains("layout"));
    }
}

// ===========================================
// sections command tests
// ===========================================
mod sections_tests {
    use super::*;

    #[test]
    fn test_sections_human_lists_headings() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        env.cmd()
            .sections("bio")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cell Biology"))
            .stdout(predicate::str::contains("1. Membrane"))
            .stdout(predicate::str::contains("2. Nucleus"));
    }

    #[test]
    fn test_sections_json_reports_blocks_and_blank() {
        let env = TestEnv::new();
        env.add_note(
            "mixed",
            &TestNote::new("Mixed").body("# Table\n| a | b |\n|---|---|\n| 1 | 2 |\n\n# Empty\n\n"),
        );

        let json: Value = env.cmd().sections("mixed").format_json().output_json();
        let sections = json["data"].as_array().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0]["heading"], "Table");
        assert_eq!(sections[0]["blocks"][0], "table");
        assert_eq!(sections[0]["blank"], false);
        assert_eq!(sections[1]["blank"], true);
    }
}

// ===========================================
// links command tests
// ===========================================
mod links_tests {
    use super::*;

    #[test]
    fn test_links_deduplicated_in_order() {
        let env = TestEnv::new();
        env.add_note(
            "n",
            &TestNote::new("N").section("A", "[[Zeta]] then [[Alpha]] and [[Zeta]] again"),
        );

        env.cmd()
            .links("n")
            .assert()
            .success()
            .stdout(predicate::eq("Zeta\nAlpha\n"));
    }

    #[test]
    fn test_links_json() {
        let env = TestEnv::new();
        env.add_note("bio", &biology());

        let json: Value = env.cmd().links("bio").format_json().output_json();
        assert_eq!(json["data"], serde_json::json!(["Genetics"]));
    }
}

// ===========================================
// image command tests
// ===========================================
mod image_tests {
    use super::*;

    #[test]
    fn test_image_add_stores_by_hash() {
        let env = TestEnv::new();
        let image = env.write_file("pic.png", &png_bytes(2, 2));

        let json: Value = env
            .cmd()
            .args(["image", "add", image.to_string_lossy().as_ref(), "--format", "json"])
            .output_json();
        let id = json["data"]["id"].as_str().unwrap();
        assert_eq!(id.len(), 64);
        assert_eq!(json["data"]["markdown"], format!("![](store:{id})"));

        let stored = std::path::PathBuf::from(json["data"]["path"].as_str().unwrap());
        assert!(stored.starts_with(env.images_dir()));
        assert!(stored.is_file());
    }

    #[test]
    fn test_image_add_rejects_non_images() {
        let env = TestEnv::new();
        let file = env.write_file("notes.txt", b"plain text");

        env.cmd()
            .args(["image", "add", file.to_string_lossy().as_ref()])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not a recognised image"));
    }
}

// ===========================================
// completions command tests
// ===========================================
mod completions_tests {
    use super::*;

    #[test]
    fn test_completions_bash() {
        let env = TestEnv::new();
        env.cmd()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cornell"));
    }
}
