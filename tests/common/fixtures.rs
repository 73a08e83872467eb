//! Static message corpora used across harnesses.

/// Messages covering every platform and media kind the classifier knows.
pub const CORPUS_LINKS: &[&str] = &[
    "watch this https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1m30s",
    "short https://www.youtube.com/shorts/abc123",
    "tweet https://x.com/someone/status/1234567890",
    "profile https://twitter.com/someone",
    "tok https://www.tiktok.com/@user/video/7312345678",
    "thread https://www.reddit.com/r/rust/comments/abc/some_title/",
    "clip https://clips.twitch.tv/FunnyClipSlug",
    "live https://kick.com/somechannel",
    "vid https://streamable.com/xyz12",
    "post https://www.instagram.com/p/Cabc123/",
    "sky https://bsky.app/profile/someone.bsky.social/post/3kabc",
    "pic https://i.imgur.com/cat.png",
    "file https://example.com/movie.webm",
    "cdn https://pbs.twimg.com/media/Fxyz?format=jpg&name=large",
    "proxied https://media.example.net/proxy?url=https%3A%2F%2Fexample.com%2Fdog.gif",
    "plain https://example.com/article",
];

/// Messages without links.
pub const CORPUS_TEXT: &[&str] = &[
    "just chatting",
    "anyone seen the stream today",
    "lol",
];
