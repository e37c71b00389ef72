mod fallback;
