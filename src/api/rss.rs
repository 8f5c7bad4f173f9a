//! RSS 2.0 feed rendering
//!
//! Renders cached posts into the wire format. The cache/sync core
//! only hands over `(Account, Vec<Post>)`; everything about the
//! output shape lives here.

use html_escape::encode_text;

use crate::data::{Account, Post};

const UPSTREAM_WEB_URL: &str = "https://twitter.com";

/// Render an account's posts as an RSS 2.0 document
///
/// Posts arrive newest-first and are emitted oldest-first, which is
/// the order feed readers expect entries to be appended in.
pub fn render_feed(account: &Account, posts: &[Post]) -> String {
    let channel_title = format!("{} / @{}", account.display_name, account.handle);
    let channel_link = format!("{UPSTREAM_WEB_URL}/{}", account.handle);

    let mut items = String::new();
    for post in posts.iter().rev() {
        render_item(&mut items, post);
    }

    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<rss version=\"2.0\">\n",
            "<channel>\n",
            "<title>{title}</title>\n",
            "<link>{link}</link>\n",
            "<description>Twitter feed for: {title}.</description>\n",
            "{items}",
            "</channel>\n",
            "</rss>\n",
        ),
        title = encode_text(&channel_title),
        link = channel_link,
        items = items,
    )
}

fn render_item(out: &mut String, post: &Post) {
    let link = format!(
        "{UPSTREAM_WEB_URL}/{}/status/{}",
        post.author.handle, post.id
    );
    // RSS author convention is "address (name)"; the address slot
    // carries the profile URL.
    let author_line = format!(
        "{UPSTREAM_WEB_URL}/{} ({} / @{})",
        post.author.handle, post.author.display_name, post.author.handle
    );

    // The description carries HTML, escaped as text inside the XML
    // element: the post text plus an <img> per media attachment.
    let mut description_html = format!("<p>{}</p>", encode_text(&post.text));
    for media in &post.media {
        description_html.push_str(&format!(
            "<img src=\"{}\" />",
            html_escape::encode_double_quoted_attribute(&media.url)
        ));
    }

    out.push_str(&format!(
        concat!(
            "<item>\n",
            "<title>{title}</title>\n",
            "<link>{link}</link>\n",
            "<description>{description}</description>\n",
            "<author>{author}</author>\n",
            "<guid isPermaLink=\"false\">{guid}</guid>\n",
            "<pubDate>{pub_date}</pubDate>\n",
            "</item>\n",
        ),
        title = encode_text(&post.text),
        link = link,
        description = encode_text(&description_html),
        author = encode_text(&author_line),
        guid = post.id,
        pub_date = post.created_at.to_rfc2822(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn account() -> Account {
        Account {
            id: 7,
            handle: "tester".to_string(),
            display_name: "Tester".to_string(),
        }
    }

    fn post(id: u64, text: &str, age_seconds: i64) -> Post {
        Post {
            id,
            text: text.to_string(),
            created_at: Utc::now() - Duration::seconds(age_seconds),
            author: account(),
            media: Vec::new(),
        }
    }

    #[test]
    fn channel_carries_account_metadata() {
        let xml = render_feed(&account(), &[]);

        assert!(xml.contains("<title>Tester / @tester</title>"));
        assert!(xml.contains("<link>https://twitter.com/tester</link>"));
        assert!(xml.contains("<description>Twitter feed for: Tester / @tester.</description>"));
    }

    #[test]
    fn item_author_carries_profile_url() {
        let xml = render_feed(&account(), &[post(103, "hello", 10)]);

        assert!(xml.contains("<author>https://twitter.com/tester (Tester / @tester)</author>"));
    }

    #[test]
    fn items_are_emitted_oldest_first() {
        let posts = vec![post(103, "newest", 10), post(101, "oldest", 30)];
        let xml = render_feed(&account(), &posts);

        let oldest = xml.find("<title>oldest</title>").unwrap();
        let newest = xml.find("<title>newest</title>").unwrap();
        assert!(oldest < newest);
        assert!(xml.contains("<guid isPermaLink=\"false\">103</guid>"));
        assert!(xml.contains("https://twitter.com/tester/status/103"));
    }

    #[test]
    fn text_is_escaped() {
        let posts = vec![post(103, "a < b & c", 10)];
        let xml = render_feed(&account(), &posts);

        assert!(xml.contains("<title>a &lt; b &amp; c</title>"));
        assert!(!xml.contains("<title>a < b & c</title>"));
    }

    #[test]
    fn media_renders_as_images_in_description() {
        let mut with_media = post(103, "look", 10);
        with_media.media = vec![crate::data::Media {
            url: "https://pbs.example.com/1.jpg".to_string(),
        }];
        let xml = render_feed(&account(), &[with_media]);

        // The img tag is escaped inside the description element.
        assert!(xml.contains("&lt;img src=\"https://pbs.example.com/1.jpg\" /&gt;"));
    }
}
