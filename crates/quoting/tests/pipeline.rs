// ABOUTME: Integration tests for the full normalization pipeline on small inline message bodies.
// ABOUTME: Covers Outlook headers, forwarded markers, PGP armor, fusion, no-match stability and idempotence.

use conversations_quoting::{
    body_html, forward_marker_offset, normalize_all, normalize_html, Normalizer,
};
use pretty_assertions::assert_eq;
use scraper::Html;

fn normalize_twice(html: &str) -> (String, String) {
    let mut doc = Html::parse_document(html);
    normalize_all(&mut doc);
    let once = body_html(&doc);
    normalize_all(&mut doc);
    (once, body_html(&doc))
}

#[test]
fn outlook_header_and_following_siblings_are_quoted() {
    let out = normalize_html(concat!(
        "<body><p>Reply</p>",
        r#"<div class="OutlookMessageHeader">From: abc@aol.com</div>"#,
        "<p>Original text</p><p>More</p></body>"
    ));
    assert_eq!(
        out,
        concat!(
            "<p>Reply</p>",
            r#"<blockquote type="cite"><div class="OutlookMessageHeader">From: abc@aol.com</div>"#,
            "<p>Original text</p><p>More</p></blockquote>"
        )
    );
}

#[test]
fn forwarded_marker_wraps_from_the_brs_before_it() {
    let out = normalize_html(concat!(
        "<body>Reply text<br><br>-----Original Message-----<br>",
        "From: a<br>To: b<br><br>body text</body>"
    ));
    assert_eq!(
        out,
        concat!(
            r#"Reply text<blockquote type="cite"><br /><br />-----Original Message-----<br />"#,
            "From: a<br />To: b<br /><br />body text</blockquote>"
        )
    );
}

#[test]
fn forwarded_marker_in_the_middle_of_a_text_node() {
    let out = normalize_html(
        "<body><div>Thanks!\n---------- Forwarded message ----------\nFrom: x</div></body>",
    );
    assert_eq!(
        out,
        concat!(
            "<div>Thanks!\n",
            r#"<blockquote type="cite">---------- Forwarded message ----------"#,
            "\nFrom: x</blockquote></div>"
        )
    );
}

#[test]
fn pgp_armor_is_never_a_forward_marker() {
    let body = "<body><pre>-----BEGIN PGP MESSAGE-----\nabc\n-----END PGP MESSAGE-----</pre></body>";
    assert_eq!(forward_marker_offset("-----BEGIN PGP MESSAGE-----"), None);
    let untouched = body_html(&Html::parse_document(body));
    assert_eq!(normalize_html(body), untouched);
}

#[test]
fn fusion_merges_siblings_and_keeps_nesting() {
    let out = normalize_html(concat!(
        "<body><blockquote>A</blockquote><br/><br/><blockquote>B</blockquote>",
        "<blockquote>C<blockquote>nested</blockquote></blockquote></body>"
    ));
    assert_eq!(
        out,
        "<blockquote>A<br /><br />BC<blockquote>nested</blockquote></blockquote>"
    );
}

#[test]
fn no_markers_means_no_change() {
    let body = concat!(
        r#"<body><p class="x">Hello,</p><div>Lunch at <b>noon</b>?</div>"#,
        "<!-- draft --><p>Thanks</p></body>"
    );
    let untouched = body_html(&Html::parse_document(body));
    assert_eq!(normalize_html(body), untouched);
}

#[test]
fn style_and_script_survive_unchanged() {
    let out = normalize_html(
        "<body><style>p > b { color: red }</style><script>a && b</script><p>x</p></body>",
    );
    assert_eq!(
        out,
        "<style>p > b { color: red }</style><script>a && b</script><p>x</p>"
    );
}

#[test]
fn outlook_header_inside_an_existing_quote_is_nested() {
    let out = normalize_html(concat!(
        r#"<body><p>my reply</p><blockquote type="cite"><p>their reply</p>"#,
        r#"<div class="OutlookMessageHeader">From: x</div><p>older</p></blockquote></body>"#
    ));
    assert_eq!(
        out,
        concat!(
            r#"<p>my reply</p><blockquote type="cite"><p>their reply</p>"#,
            r#"<blockquote type="cite"><div class="OutlookMessageHeader">From: x</div><p>older</p></blockquote>"#,
            "</blockquote>"
        )
    );
}

#[test]
fn forwarded_marker_inside_an_existing_quote_is_nested() {
    let out = normalize_html(
        r#"<body>top<blockquote type="cite">theirs<br>-----Original Message-----<br>old</blockquote></body>"#,
    );
    assert_eq!(
        out,
        concat!(
            r#"top<blockquote type="cite">theirs<blockquote type="cite">"#,
            "<br />-----Original Message-----<br />old</blockquote></blockquote>"
        )
    );
}

#[test]
fn hotmail_rule_opening_the_message_is_kept() {
    assert_eq!(
        normalize_html("<body><hr>intro<hr>quoted</body>"),
        "<hr />intro<hr />quoted"
    );
}

#[test]
fn marker_that_opens_the_message_is_not_wrapped() {
    let body = r#"<body><div class="yahoo_quoted">On Monday, a wrote:</div><p>old</p></body>"#;
    let untouched = body_html(&Html::parse_document(body));
    assert_eq!(normalize_html(body), untouched);
}

#[test]
fn disabled_pipeline_leaves_markers_alone() {
    let normalizer = Normalizer::builder()
        .outlook(false)
        .hotmail(false)
        .misc(false)
        .forwarded(false)
        .fusion(false)
        .build();
    let body = concat!(
        "<body><p>Reply</p><hr><p>old</p>",
        "<blockquote>a</blockquote><blockquote>b</blockquote></body>"
    );
    let untouched = body_html(&Html::parse_document(body));
    assert_eq!(normalizer.normalize_html(body), untouched);
}

#[test]
fn normalizing_twice_equals_once() {
    let bodies = [
        r#"<body><p>Reply</p><div class="OutlookMessageHeader">From: a</div><p>x</p></body>"#,
        r#"<body><p>Reply</p><div style="border:none;border-top:solid #E1E1E1 1.0pt">From: a</div><p>x</p></body>"#,
        "<body><p>Reply</p><hr><p>From: a</p></body>",
        r#"<body><p>Reply</p><div class="yahoo_quoted">On Monday</div><p>x</p></body>"#,
        "<body>Reply<br>-----Original Message-----<br>From: a</body>",
        "<body>hi<blockquote>a</blockquote> <br> <blockquote>b</blockquote></body>",
        "<body><p>Nothing to see here.</p></body>",
        "<body><hr>intro<hr>quoted</body>",
        r#"<body><p>Reply</p><hr><p>a</p><hr id="stopSpelling"><p>b</p></body>"#,
        r#"<body><p>me</p><blockquote type="cite"><p>them</p><div class="OutlookMessageHeader">From: x</div><p>older</p></blockquote></body>"#,
        r#"<body>top<blockquote type="cite">theirs<br>-----Original Message-----<br>old</blockquote></body>"#,
    ];
    for body in bodies {
        let (once, twice) = normalize_twice(body);
        assert_eq!(once, twice, "not idempotent for {}", body);
    }
}
