// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn request(instruction: &str) -> ImageRequest {
    ImageRequest {
        instruction: instruction.to_string(),
        exclusions: "text, words".to_string(),
        width: 592,
        height: 832,
        seed: 42,
    }
}

#[tokio::test]
async fn test_command_generator_sends_request_on_stdin() {
    let generator = CommandGenerator::new(CommandSpec::new("cat"));

    let image = generator.generate_image(&request("apple")).await.unwrap();

    let echoed: serde_json::Value = serde_json::from_slice(&image.data).unwrap();
    assert_eq!(echoed["instruction"], "apple");
    assert_eq!(echoed["seed"], 42);
    assert_eq!((image.width, image.height), (592, 832));
}

#[tokio::test]
async fn test_command_generator_passes_size_in_env() {
    let generator = CommandGenerator::new(
        CommandSpec::new("sh")
            .arg("-c")
            .arg("cat >/dev/null; printf '%sx%s/%s' $BW_WIDTH $BW_HEIGHT $BW_SEED"),
    );

    let image = generator.generate_image(&request("apple")).await.unwrap();

    assert_eq!(image.data, b"592x832/42");
}

#[tokio::test]
async fn test_command_generator_reports_exit_status() {
    let generator = CommandGenerator::new(
        CommandSpec::new("sh")
            .arg("-c")
            .arg("cat >/dev/null; echo 'cuda out of memory' >&2; exit 2"),
    );

    let err = generator.generate_image(&request("apple")).await.unwrap_err();

    assert!(
        matches!(&err, GenerationError::Failed(msg) if msg == "exit code 2: cuda out of memory")
    );
}

#[tokio::test]
async fn test_command_generator_rejects_empty_output() {
    let generator =
        CommandGenerator::new(CommandSpec::new("sh").arg("-c").arg("cat >/dev/null"));

    let err = generator.generate_image(&request("apple")).await.unwrap_err();

    assert!(matches!(err, GenerationError::Empty));
}

#[tokio::test]
async fn test_fake_generator_fails_then_recovers() {
    let generator = FakeGenerator::new();
    generator.fail_next(1, "transient");

    assert!(generator.generate_image(&request("apple")).await.is_err());
    let image = generator.generate_image(&request("apple")).await.unwrap();

    assert_eq!(image.data, b"42|apple");
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn test_fake_generator_fails_matching_instruction() {
    let generator = FakeGenerator::new();
    generator.fail_when("pear", "bad page");

    assert!(generator.generate_image(&request("apple")).await.is_ok());
    assert!(generator.generate_image(&request("pear drawing")).await.is_err());
}
