//! GitHub `user-attachments` references and their gist replacements.

use lazy_regex::regex;

/// A reference-style link definition pointing at a user-attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub name: String,
    pub url: String,
    pub asset_id: String,
}

/// Link definitions `[name]: https://github.com/user-attachments/assets/{id}`
/// in `content`, in document order.
pub fn find_attachment_refs(content: &str) -> Vec<AttachmentRef> {
    regex!(
        r"(?m)^\[([^\]]+)\]:[ \t]+(https://github\.com/user-attachments/assets/([a-f0-9-]+))[ \t]*$"
    )
    .captures_iter(content)
    .map(|caps| AttachmentRef {
        name: caps[1].to_string(),
        url: caps[2].to_string(),
        asset_id: caps[3].to_string(),
    })
    .collect()
}

/// File extension guessed from magic bytes.
pub fn sniff_extension(data: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG", ".png"),
        (b"\xff\xd8\xff", ".jpg"),
        (b"GIF8", ".gif"),
        (b"%PDF", ".pdf"),
        (b"PK\x03\x04", ".zip"),
    ];
    SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map_or(".bin", |(_, ext)| ext)
}

/// Raw URL of a blob pinned to its content hash.
pub fn raw_permalink(owner: &str, gist_id: &str, blob_sha: &str, filename: &str) -> String {
    format!("https://gist.githubusercontent.com/{owner}/{gist_id}/raw/{blob_sha}/{filename}")
}

/// An inline image `![alt](target)` whose target is not a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalImage {
    pub markdown: String,
    pub alt: String,
    pub path: String,
}

/// Inline images pointing at local paths, in document order.
pub fn find_local_images(body: &str) -> Vec<LocalImage> {
    regex!(r"!\[([^\]]*)\]\(([^)]+)\)")
        .captures_iter(body)
        .filter(|caps| !caps[2].starts_with("http"))
        .map(|caps| LocalImage {
            markdown: caps[0].to_string(),
            alt: caps[1].to_string(),
            path: caps[2].to_string(),
        })
        .collect()
}

/// Replace each image's markdown with an `<img>` tag for its uploaded URL.
pub fn replace_local_images(body: &str, uploaded: &[(LocalImage, String)]) -> String {
    uploaded.iter().fold(body.to_string(), |acc, (image, url)| {
        acc.replace(
            &image.markdown,
            &format!("<img alt=\"{}\" src=\"{url}\" />", image.alt),
        )
    })
}

/// Rewrite `[name]: old` to `[name]: new` for each `(reference, new_url)`.
pub fn replace_refs(content: &str, replacements: &[(AttachmentRef, String)]) -> String {
    replacements
        .iter()
        .fold(content.to_string(), |acc, (reference, new_url)| {
            acc.replace(
                &format!("[{}]: {}", reference.name, reference.url),
                &format!("[{}]: {new_url}", reference.name),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use rstest::rstest;

    const CONTENT: &str = indoc! {"
        # [o/r#1] Screenshots

        ![before][shot1]

        [shot1]: https://github.com/user-attachments/assets/0a1b-2c3d
        [docs]: https://example.com/docs
        [shot2]: https://github.com/user-attachments/assets/ffff-0000
    "};

    #[test]
    fn finds_only_user_attachment_definitions() {
        let refs = find_attachment_refs(CONTENT);
        assert_eq!(
            refs,
            vec![
                AttachmentRef {
                    name: "shot1".to_string(),
                    url: "https://github.com/user-attachments/assets/0a1b-2c3d".to_string(),
                    asset_id: "0a1b-2c3d".to_string(),
                },
                AttachmentRef {
                    name: "shot2".to_string(),
                    url: "https://github.com/user-attachments/assets/ffff-0000".to_string(),
                    asset_id: "ffff-0000".to_string(),
                },
            ]
        );
    }

    #[test]
    fn inline_attachment_links_are_ignored() {
        let content = "See ![x](https://github.com/user-attachments/assets/abcd)\n";
        assert!(find_attachment_refs(content).is_empty());
    }

    #[rstest]
    #[case::png(b"\x89PNG\r\n\x1a\n", ".png")]
    #[case::jpg(b"\xff\xd8\xff\xe0", ".jpg")]
    #[case::gif(b"GIF89a", ".gif")]
    #[case::pdf(b"%PDF-1.7", ".pdf")]
    #[case::zip(b"PK\x03\x04rest", ".zip")]
    #[case::unknown(b"hello", ".bin")]
    #[case::empty(b"", ".bin")]
    fn sniffs_extensions(#[case] data: &[u8], #[case] expected: &str) {
        assert_eq!(sniff_extension(data), expected);
    }

    #[test]
    fn local_images_skip_urls() {
        let body = indoc! {"
            ![diagram](docs/flow.png) and ![](shot.jpg)
            ![remote](https://example.com/a.png)
        "};
        let images = find_local_images(body);
        assert_eq!(
            images,
            vec![
                LocalImage {
                    markdown: "![diagram](docs/flow.png)".to_string(),
                    alt: "diagram".to_string(),
                    path: "docs/flow.png".to_string(),
                },
                LocalImage {
                    markdown: "![](shot.jpg)".to_string(),
                    alt: String::new(),
                    path: "shot.jpg".to_string(),
                },
            ]
        );
    }

    #[test]
    fn local_images_become_img_tags() {
        let body = "Before ![diagram](flow.png) after";
        let images = find_local_images(body);
        let uploaded = vec![(images[0].clone(), "https://host/flow.png".to_string())];
        assert_eq!(
            replace_local_images(body, &uploaded),
            "Before <img alt=\"diagram\" src=\"https://host/flow.png\" /> after"
        );
    }

    #[test]
    fn permalink_format() {
        assert_eq!(
            raw_permalink("me", "g1", "deadbeef", "a.png"),
            "https://gist.githubusercontent.com/me/g1/raw/deadbeef/a.png"
        );
    }

    #[test]
    fn replaces_only_matching_definitions() {
        let refs = find_attachment_refs(CONTENT);
        let replacements = vec![(refs[0].clone(), "https://gist.example/a.png".to_string())];
        let out = replace_refs(CONTENT, &replacements);
        assert!(out.contains("[shot1]: https://gist.example/a.png\n"));
        assert!(out.contains("[shot2]: https://github.com/user-attachments/assets/ffff-0000"));
        assert!(out.contains("![before][shot1]"));
    }
}
